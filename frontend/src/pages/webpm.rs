//! `/webpm`: installed components, one lazy branch per kind.

use shared::{CdnPackage, CdnStatus, WebpmKind};
use std::sync::Arc;

use super::{PageDeps, gone_view};
use crate::grouping::{self, NAMESPACE_PREFIX, group_by_namespace, namespace_id, skip_namespace};
use crate::nav::{LazyBranch, Layout, NavNode, Resolution, RouterContext};
use crate::state::AppState;
use crate::view::View;

const KINDS: [WebpmKind; 4] = [
    WebpmKind::Webapp,
    WebpmKind::Esm,
    WebpmKind::Pyodide,
    WebpmKind::Backend,
];

fn segment(kind: WebpmKind) -> &'static str {
    match kind {
        WebpmKind::Webapp => "webapps",
        WebpmKind::Esm => "esm",
        WebpmKind::Pyodide => "pyodide",
        WebpmKind::Backend => "backends",
    }
}

fn title(kind: WebpmKind) -> &'static str {
    match kind {
        WebpmKind::Webapp => "Web Applications",
        WebpmKind::Esm => "ESM",
        WebpmKind::Pyodide => "Pyodide",
        WebpmKind::Backend => "Backends",
    }
}

fn icon(kind: WebpmKind) -> &'static str {
    match kind {
        WebpmKind::Webapp => "fas fa-code",
        WebpmKind::Esm => "fab fa-js",
        WebpmKind::Pyodide => "fab fa-python",
        WebpmKind::Backend => "fas fa-network-wired",
    }
}

pub fn navigation(deps: &PageDeps) -> NavNode {
    let state = deps.state.clone();
    NavNode::new(
        "webpm",
        "WebPM",
        Layout::new(move |_ctx: &RouterContext| {
            let status = state.components.latest();
            let mut children = vec![
                View::title("Components", "fas fa-microchip"),
                View::markdown("Installed components, retrieved when requested or published from your projects."),
            ];
            children.extend(KINDS.iter().map(|kind| count_summary(&status, *kind)));
            View::column(children)
        }),
    )
    .with_icon("fas fa-microchip")
    .with_routes(KINDS.map(|kind| kind_branch(&deps.state, kind)))
}

fn count_summary(status: &CdnStatus, kind: WebpmKind) -> View {
    let packages = status
        .packages
        .iter()
        .filter(|package| package.latest_kind() == Some(kind))
        .count();
    let versions = status
        .packages
        .iter()
        .flat_map(|package| &package.versions)
        .filter(|version| version.kind == kind)
        .count();
    View::field(title(kind), format!("{packages} package(s), {versions} version(s)"))
}

fn kind_branch(state: &AppState, kind: WebpmKind) -> NavNode {
    let page_state = state.clone();
    let resolver_state = state.clone();
    NavNode::new(
        segment(kind),
        title(kind),
        Layout::new(move |_ctx: &RouterContext| {
            View::column(vec![
                View::title(title(kind), icon(kind)),
                count_summary(&page_state.components.latest(), kind),
            ])
        }),
    )
    .with_icon(icon(kind))
    .with_lazy(LazyBranch::new(
        state.components.clone(),
        move |status: &Arc<CdnStatus>, residual: &[String], _ctx: &RouterContext| {
            resolve_packages(&resolver_state, status, kind, residual)
        },
    ))
}

/// Packages whose latest version is of `kind`, grouped by namespace.
fn resolve_packages(state: &AppState, status: &CdnStatus, kind: WebpmKind, residual: &[String]) -> Resolution {
    let packages = status
        .packages
        .iter()
        .filter(|package| package.latest_kind() == Some(kind));
    let grouped = group_by_namespace(packages, |package| package.name.as_str());
    match residual {
        [] => {
            let namespaces = grouped.namespaces.iter().map(|(namespace, members)| {
                let namespace = namespace.clone();
                let links: Vec<View> = members.iter().map(|package| package_link(package)).collect();
                NavNode::new(
                    namespace_id(&namespace),
                    namespace.clone(),
                    Layout::new(move |_ctx: &RouterContext| {
                        View::column(vec![View::title(namespace.clone(), "fas fa-object-group"), View::list(links.clone())])
                    }),
                )
                .with_icon("fas fa-object-group")
            });
            let direct = grouped.direct.iter().map(|package| package_node(state, package));
            Resolution::children(namespaces.chain(direct).collect::<Vec<_>>())
        }
        [namespace] => match namespace.strip_prefix(NAMESPACE_PREFIX) {
            Some(namespace) => Resolution::children(
                grouped
                    .members(namespace)
                    .into_iter()
                    .map(|package| package_node(state, package)),
            ),
            None => Resolution::none(),
        },
        _ => Resolution::none(),
    }
}

fn package_node(state: &AppState, package: &CdnPackage) -> NavNode {
    let state = state.clone();
    let id = package.id.clone();
    NavNode::new(
        package.id.clone(),
        skip_namespace(&package.name),
        Layout::new(move |_ctx: &RouterContext| package_view(state.package(&id).as_ref(), &id)),
    )
    .leaf()
}

fn package_link(package: &CdnPackage) -> View {
    View::link(package.name.clone(), package_nav(package).unwrap_or_default())
}

fn package_view(package: Option<&CdnPackage>, id: &str) -> View {
    let Some(package) = package else {
        return gone_view(id, "fas fa-box", format!("Package `{id}` is no longer installed."));
    };
    let latest = package.versions.last();
    View::column(vec![
        View::title(package.name.clone(), "fas fa-box"),
        View::field(
            "Latest",
            latest.map(|version| version.version.clone()).unwrap_or_default(),
        ),
        View::section(
            "Versions",
            package
                .versions
                .iter()
                .rev()
                .map(|version| View::text(version.version.clone()))
                .collect(),
        ),
    ])
}

/// Navigation path of a package, from the kind of its latest version.
pub fn package_nav(package: &CdnPackage) -> Option<String> {
    let kind = package.latest_kind()?;
    let namespace = grouping::namespace(&package.name)
        .map(|namespace| format!("/{}", namespace_id(namespace)))
        .unwrap_or_default();
    Some(format!("/webpm/{}{namespace}/{}", segment(kind), package.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CdnVersion;

    fn package(name: &str, kinds: &[WebpmKind]) -> CdnPackage {
        CdnPackage {
            id: format!("id-{}", name.replace('/', "-")),
            name: name.to_string(),
            versions: kinds
                .iter()
                .enumerate()
                .map(|(index, kind)| CdnVersion {
                    version: format!("0.{index}.0"),
                    kind: *kind,
                })
                .collect(),
        }
    }

    #[test]
    fn nav_follows_latest_kind_and_namespace() {
        let moved = package("@youwol/tool", &[WebpmKind::Esm, WebpmKind::Webapp]);
        assert_eq!(package_nav(&moved).as_deref(), Some("/webpm/webapps/ns_@youwol/id-@youwol-tool"));
        let plain = package("rxjs", &[WebpmKind::Esm]);
        assert_eq!(package_nav(&plain).as_deref(), Some("/webpm/esm/id-rxjs"));
        assert_eq!(package_nav(&package("empty", &[])), None);
    }
}
