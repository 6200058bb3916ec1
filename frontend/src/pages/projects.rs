//! `/projects`: local projects below each finder, nested by folder then namespace.
//!
//! Levels are `finder / [ns_x /] project / [ns_y /] nested project ...`; a
//! project is a child of the closest project (or finder) whose folder holds it.

use futures_signals::map_ref;
use shared::{Project, ProjectsFinder};
use std::sync::Arc;

use super::{PageDeps, gone_view};
use crate::dataflow::Actor;
use crate::grouping::{self, NAMESPACE_PREFIX, direct_children, group_by_namespace, is_under, namespace_id, skip_namespace};
use crate::nav::{LazyBranch, Layout, NavNode, Resolution, RouterContext};
use crate::path_codec;
use crate::state::AppState;
use crate::view::{NoteLevel, View};

/// Finders and projects, combined so that a change of either re-resolves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectsSnapshot {
    pub finders: Vec<ProjectsFinder>,
    pub projects: Vec<Project>,
}

fn projects_snapshot(state: &AppState) -> Actor<Arc<ProjectsSnapshot>> {
    let combined = map_ref! {
        let environment = state.environment.signal(),
        let status = state.projects.signal() =>
        Arc::new(ProjectsSnapshot {
            finders: environment.projects.finders.clone(),
            projects: status.projects.clone(),
        })
    };
    Actor::derived(Arc::default(), combined)
}

pub fn navigation(deps: &PageDeps) -> NavNode {
    let page_state = deps.state.clone();
    let resolver_state = deps.state.clone();
    NavNode::new(
        "projects",
        "Projects",
        Layout::new(move |_ctx: &RouterContext| overview(&page_state)),
    )
    .with_icon("fas fa-boxes")
    .with_lazy(LazyBranch::new(
        projects_snapshot(&deps.state),
        move |snapshot: &Arc<ProjectsSnapshot>, residual: &[String], _ctx: &RouterContext| {
            resolve_projects(&resolver_state, snapshot, residual)
        },
    ))
}

fn overview(state: &AppState) -> View {
    let environment = state.environment.latest();
    let status = state.projects.latest();
    let mut children = vec![View::title("Projects", "fas fa-boxes")];
    if environment.projects.finders.is_empty() {
        children.push(View::note(NoteLevel::Info, "No projects finder is configured."));
    }
    children.extend(environment.projects.finders.iter().map(|finder| {
        View::link(
            finder.name.clone(),
            format!("/projects/{}", path_codec::encode(&finder.from_path)),
        )
    }));
    children.extend(status.failures.iter().map(|failure| {
        View::note(
            NoteLevel::Warning,
            format!("Project at `{}` failed to load: {}", failure.path, failure.message),
        )
    }));
    View::column(children)
}

fn resolve_projects(state: &AppState, snapshot: &ProjectsSnapshot, residual: &[String]) -> Resolution {
    let Some((finder_token, rest)) = residual.split_first() else {
        let mut finders: Vec<_> = snapshot.finders.iter().collect();
        finders.sort_by(|a, b| a.name.cmp(&b.name));
        return Resolution::children(finders.into_iter().map(|finder| finder_node(state, finder)));
    };
    let Ok(from_path) = path_codec::decode(finder_token) else {
        return Resolution::none();
    };
    if !snapshot.finders.iter().any(|finder| finder.from_path == from_path) {
        return Resolution::none();
    }

    let mut scope = from_path;
    let mut selected_namespace: Option<String> = None;
    for segment in rest {
        if let Some(namespace) = segment.strip_prefix(NAMESPACE_PREFIX) {
            if selected_namespace.is_some() {
                return Resolution::none();
            }
            selected_namespace = Some(namespace.to_string());
            continue;
        }
        let found = direct_children(&scope, &snapshot.projects, |project| project.path.as_str())
            .into_iter()
            .filter(|project| grouping::namespace(&project.name) == selected_namespace.as_deref())
            .find(|project| project.id == *segment);
        let Some(project) = found else {
            return Resolution::none();
        };
        scope = project.path.clone();
        selected_namespace = None;
    }

    let children = direct_children(&scope, &snapshot.projects, |project| project.path.as_str());
    let grouped = group_by_namespace(children, |project| project.name.as_str());
    let node = |project: &Project| project_node(state, snapshot, project);
    match selected_namespace {
        Some(namespace) => {
            let members = grouped.members(&namespace);
            if members.is_empty() {
                return Resolution::none();
            }
            Resolution::children(members.into_iter().map(node))
        }
        None => {
            let namespaces = grouped.namespaces.iter().map(|(namespace, members)| {
                let links: Vec<View> = members
                    .iter()
                    .map(|project| View::text(format!("{}#{}", project.name, project.version)))
                    .collect();
                let title = namespace.clone();
                NavNode::new(
                    namespace_id(namespace),
                    namespace.clone(),
                    Layout::new(move |_ctx: &RouterContext| {
                        View::column(vec![View::title(title.clone(), "fas fa-object-group"), View::list(links.clone())])
                    }),
                )
                .with_icon("fas fa-object-group")
            });
            let direct = grouped.direct.into_iter().map(node);
            Resolution::children(namespaces.chain(direct).collect::<Vec<_>>())
        }
    }
}

fn finder_node(state: &AppState, finder: &ProjectsFinder) -> NavNode {
    let state = state.clone();
    let from_path = finder.from_path.clone();
    let name = finder.name.clone();
    NavNode::new(
        path_codec::encode(&finder.from_path),
        finder.name.clone(),
        Layout::new(move |_ctx: &RouterContext| {
            let status = state.projects.latest();
            let count = status
                .projects
                .iter()
                .filter(|project| is_under(&project.path, &from_path))
                .count();
            View::column(vec![
                View::title(name.clone(), "fas fa-search"),
                View::field("Folder", from_path.clone()),
                View::field("Projects", count.to_string()),
            ])
        }),
    )
    .with_icon("fas fa-search")
}

fn project_node(state: &AppState, snapshot: &ProjectsSnapshot, project: &Project) -> NavNode {
    let nested = direct_children(&project.path, &snapshot.projects, |other| other.path.as_str());
    let state = state.clone();
    let id = project.id.clone();
    NavNode::new(
        project.id.clone(),
        skip_namespace(&project.name),
        Layout::new(move |_ctx: &RouterContext| project_view(state.project(&id).as_ref(), &id)),
    )
    .with_icon("fas fa-box-open")
    .with_leaf(nested.is_empty())
}

fn project_view(project: Option<&Project>, id: &str) -> View {
    let Some(project) = project else {
        return gone_view(id, "fas fa-box-open", format!("Project `{id}` is no longer available."));
    };
    View::column(vec![
        View::title(project.name.clone(), "fas fa-box-open"),
        View::field("Version", project.version.clone()),
        View::field("Folder", project.path.clone()),
        View::field("Id", project.id.clone()),
    ])
}

/// Navigation path of the project named `name`, at `version` or else its
/// lowest version.
pub fn project_nav(state: &AppState, name: &str, version: Option<&str>) -> Option<String> {
    let status = state.projects.latest();
    let environment = state.environment.latest();
    let mut candidates = status.projects.iter().filter(|project| project.name == name);
    let project = match version {
        Some(version) => candidates.find(|project| project.version == version),
        None => candidates.min_by(|a, b| a.version.cmp(&b.version)),
    }?;
    let finder = environment
        .projects
        .finders
        .iter()
        .filter(|finder| is_under(&project.path, &finder.from_path))
        .max_by_key(|finder| finder.from_path.trim_end_matches('/').len())?;

    let mut chain: Vec<&Project> = status
        .projects
        .iter()
        .filter(|ancestor| {
            is_under(&ancestor.path, &finder.from_path) && is_under(&project.path, &ancestor.path)
        })
        .collect();
    chain.sort_by_key(|ancestor| ancestor.path.len());
    chain.push(project);

    let mut path = format!("/projects/{}", path_codec::encode(&finder.from_path));
    for step in chain {
        if let Some(namespace) = grouping::namespace(&step.name) {
            path.push('/');
            path.push_str(&namespace_id(namespace));
        }
        path.push('/');
        path.push_str(&step.id);
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{EnvironmentStatus, ProjectsSection, ProjectsStatus};

    fn project(id: &str, name: &str, version: &str, path: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            path: path.to_string(),
        }
    }

    fn snapshot() -> ProjectsSnapshot {
        ProjectsSnapshot {
            finders: vec![ProjectsFinder {
                name: "Home".to_string(),
                from_path: "/home/dev".to_string(),
            }],
            projects: vec![
                project("p-lib", "@youwol/lib", "1.0.0", "/home/dev/lib"),
                project("p-app", "app", "0.1.0", "/home/dev/app"),
                project("p-inner", "@youwol/inner", "0.1.0", "/home/dev/app/inner"),
            ],
        }
    }

    #[tokio::test]
    async fn residual_paths_walk_folders_then_namespaces() {
        let state = AppState::new();
        let snapshot = snapshot();
        let token = path_codec::encode("/home/dev");
        let Resolution::Ready(Some(top)) = resolve_projects(&state, &snapshot, &[token.clone()]) else {
            panic!("finder listing should be ready");
        };
        assert_eq!(top.keys().collect::<Vec<_>>(), vec!["ns_@youwol", "p-app"]);
        assert!(!top["p-app"].is_leaf());

        let nested = [token.clone(), "p-app".to_string(), "ns_@youwol".to_string()];
        let Resolution::Ready(Some(inner)) = resolve_projects(&state, &snapshot, &nested) else {
            panic!("nested namespace should be ready");
        };
        assert!(inner["p-inner"].is_leaf());
        assert_eq!(inner["p-inner"].name, "inner");

        let wrong = [token, "p-lib".to_string()];
        assert!(matches!(resolve_projects(&state, &snapshot, &wrong), Resolution::Ready(None)));
    }

    #[tokio::test]
    async fn project_nav_builds_the_ancestor_chain() {
        let state = AppState::new();
        let snapshot = snapshot();
        state.environment_received_relay.send(EnvironmentStatus {
            projects: ProjectsSection {
                finders: snapshot.finders.clone(),
            },
            ..EnvironmentStatus::default()
        });
        state.projects_received_relay.send(ProjectsStatus {
            projects: snapshot.projects.clone(),
            failures: Vec::new(),
        });
        state.environment.wait_until(|env| !env.projects.finders.is_empty()).await;
        state.projects.wait_until(|status| !status.projects.is_empty()).await;

        let token = path_codec::encode("/home/dev");
        assert_eq!(
            project_nav(&state, "@youwol/inner", None),
            Some(format!("/projects/{token}/p-app/ns_@youwol/p-inner"))
        );
        assert_eq!(project_nav(&state, "@youwol/lib", Some("2.0.0")), None);
    }
}
