//! `/environment`: server logs, running backends, ESM servers and pending operations.

use shared::{EnvironmentStatus, LogEntry, ProxiedBackend, partition_display_name};
use std::sync::Arc;

use super::{PageDeps, gone_view};
use crate::clients::LogsClient;
use crate::nav::{Content, LazyBranch, Layout, NavNode, Resolution, RouterContext};
use crate::state::AppState;
use crate::view::{NoteLevel, View};

pub fn navigation(deps: &PageDeps) -> NavNode {
    let state = deps.state.clone();
    NavNode::new(
        "environment",
        "Environment",
        Layout::new(move |_ctx: &RouterContext| overview(&state.environment.latest())),
    )
    .with_icon("fas fa-cogs")
    .with_routes([
        logs(&deps.clients.logs),
        backends(&deps.state),
        esm_servers(&deps.state),
        notifications(&deps.state),
    ])
}

fn overview(env: &EnvironmentStatus) -> View {
    View::column(vec![
        View::title("Environment", "fas fa-cogs"),
        View::field("Configuration", env.paths_book.config.clone()),
        View::field("Databases", env.paths_book.databases.clone()),
        View::field("Backends serving", env.proxied_backends.len().to_string()),
        View::field("ESM servers serving", env.proxied_esm_servers.len().to_string()),
    ])
}

// ===== LOGS =====

const MAX_ROOT_LOGS: usize = 1000;

/// Fetched again on every render, so a refresh shows new entries.
fn logs(client: &Arc<dyn LogsClient>) -> NavNode {
    let client = client.clone();
    NavNode::new(
        "logs",
        "Logs",
        Layout::new(move |_ctx: &RouterContext| {
            let request = client.query_root_logs(MAX_ROOT_LOGS);
            Content::pending(async move { Ok(logs_view(&request.await?.logs)) })
        }),
    )
    .with_icon("fas fa-bug")
    .leaf()
}

fn logs_view(logs: &[LogEntry]) -> View {
    let mut children = vec![View::title("Logs", "fas fa-bug")];
    if logs.is_empty() {
        children.push(View::note(NoteLevel::Info, "No logs recorded yet."));
        return View::column(children);
    }
    let mut logs: Vec<_> = logs.iter().collect();
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    children.push(View::list(
        logs.into_iter()
            .map(|entry| View::text(format!("[{}] {} {}", entry.level, entry.timestamp, entry.text)))
            .collect(),
    ));
    View::column(children)
}

// ===== BACKENDS =====

fn backends(state: &AppState) -> NavNode {
    let page_state = state.clone();
    let resolver_state = state.clone();
    NavNode::new(
        "backends",
        "Backends",
        Layout::new(move |_ctx: &RouterContext| partitions_view(&page_state.environment.latest())),
    )
    .with_icon("fas fa-server")
    .with_lazy(LazyBranch::new(
        state.environment.clone(),
        move |env: &Arc<EnvironmentStatus>, residual: &[String], _ctx: &RouterContext| {
            resolve_backends(&resolver_state, env, residual)
        },
    ))
}

/// Partitions, then their instances.
fn resolve_backends(state: &AppState, env: &EnvironmentStatus, residual: &[String]) -> Resolution {
    match residual {
        [] => {
            Resolution::children(partitions(env).into_iter().map(|partition_id| {
                let page_state = state.clone();
                let id = partition_id.to_string();
                NavNode::new(
                    partition_id,
                    partition_display_name(partition_id),
                    Layout::new(move |_ctx: &RouterContext| {
                        partition_view(&page_state.environment.latest(), &id)
                    }),
                )
                .with_icon("fas fa-network-wired")
            }))
        }
        [partition_id] => {
            let instances = instances(env, partition_id);
            if instances.is_empty() {
                return Resolution::none();
            }
            Resolution::children(instances.into_iter().map(|backend| {
                let page_state = state.clone();
                let uid = backend.uid.clone();
                NavNode::new(
                    backend.uid.clone(),
                    backend.display_name(),
                    Layout::new(move |_ctx: &RouterContext| {
                        backend_view(page_state.backend(&uid).as_ref(), &uid)
                    }),
                )
                .with_icon("fas fa-terminal")
                .leaf()
            }))
        }
        _ => Resolution::none(),
    }
}

/// Distinct partitions, by display name then id.
fn partitions(env: &EnvironmentStatus) -> Vec<&str> {
    let mut partitions: Vec<&str> = env
        .proxied_backends
        .iter()
        .map(|backend| backend.partition_id.as_str())
        .collect();
    partitions.sort_by(|a, b| {
        partition_display_name(a)
            .cmp(partition_display_name(b))
            .then(a.cmp(b))
    });
    partitions.dedup();
    partitions
}

/// Instances of a partition, by display name then start time.
fn instances<'a>(env: &'a EnvironmentStatus, partition_id: &str) -> Vec<&'a ProxiedBackend> {
    let mut instances: Vec<_> = env
        .proxied_backends
        .iter()
        .filter(|backend| backend.partition_id == partition_id)
        .collect();
    instances.sort_by(|a, b| {
        a.display_name()
            .cmp(&b.display_name())
            .then(a.started_at.cmp(&b.started_at))
    });
    instances
}

fn partitions_view(env: &EnvironmentStatus) -> View {
    let mut children = vec![View::title("Backends", "fas fa-server")];
    if env.proxied_backends.is_empty() {
        children.push(View::note(NoteLevel::Info, "No backends are currently running."));
        return View::column(children);
    }
    children.extend(partitions(env).into_iter().map(|partition_id| {
        View::link(
            format!(
                "{} ({} instance(s))",
                partition_display_name(partition_id),
                instances(env, partition_id).len()
            ),
            format!("/environment/backends/{partition_id}"),
        )
    }));
    View::column(children)
}

fn partition_view(env: &EnvironmentStatus, partition_id: &str) -> View {
    let instances = instances(env, partition_id);
    if instances.is_empty() {
        return gone_view(
            partition_display_name(partition_id),
            "fas fa-network-wired",
            format!("Partition `{partition_id}` has no running instance anymore."),
        );
    }
    View::column(vec![
        View::title(partition_display_name(partition_id), "fas fa-network-wired"),
        View::section(
            "Running Instances",
            instances
                .into_iter()
                .map(|backend| {
                    View::link(
                        backend.display_name(),
                        format!("/environment/backends/{partition_id}/{}", backend.uid),
                    )
                })
                .collect(),
        ),
    ])
}

fn backend_view(backend: Option<&ProxiedBackend>, uid: &str) -> View {
    let Some(backend) = backend else {
        return gone_view(uid, "fas fa-terminal", format!("Backend `{uid}` is no longer running."));
    };
    View::column(vec![
        View::title(backend.display_name(), "fas fa-terminal"),
        View::field("Partition", partition_display_name(&backend.partition_id)),
        View::field("UID", backend.uid.clone()),
        View::field("Started at", backend.started_at.to_string()),
        View::field(
            "Port",
            backend
                .port
                .map(|port| port.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ])
}

// ===== ESM SERVERS =====

fn esm_servers(state: &AppState) -> NavNode {
    let page_state = state.clone();
    let resolver_state = state.clone();
    NavNode::new(
        "esm-servers",
        "ESM Servers",
        Layout::new(move |_ctx: &RouterContext| {
            let env = page_state.environment.latest();
            let mut children = vec![View::title("ESM Servers", "fab fa-js")];
            if env.proxied_esm_servers.is_empty() {
                children.push(View::note(NoteLevel::Info, "No ESM servers are currently running."));
            }
            children.extend(env.proxied_esm_servers.iter().map(|server| {
                View::link(
                    format!("{}#{}", server.package, server.version),
                    format!("/environment/esm-servers/{}", server.uid),
                )
            }));
            View::column(children)
        }),
    )
    .with_icon("fab fa-js")
    .with_lazy(LazyBranch::new(
        state.environment.clone(),
        move |env: &Arc<EnvironmentStatus>, residual: &[String], _ctx: &RouterContext| {
            if !residual.is_empty() {
                return Resolution::none();
            }
            let mut servers: Vec<_> = env.proxied_esm_servers.iter().collect();
            servers.sort_by(|a, b| (&a.package, &a.version).cmp(&(&b.package, &b.version)));
            Resolution::children(servers.into_iter().map(|server| {
                let page_state = resolver_state.clone();
                let uid = server.uid.clone();
                NavNode::new(
                    server.uid.clone(),
                    format!("{}#{}", server.package, server.version),
                    Layout::new(move |_ctx: &RouterContext| match page_state.esm_server(&uid) {
                        Some(server) => View::column(vec![
                            View::title(format!("{}#{}", server.package, server.version), "fab fa-js"),
                            View::field("UID", server.uid),
                            View::field(
                                "Port",
                                server.port.map(|port| port.to_string()).unwrap_or_else(|| "-".to_string()),
                            ),
                        ]),
                        None => gone_view(&uid, "fab fa-js", format!("ESM server `{uid}` is no longer running.")),
                    }),
                )
                .with_icon("fas fa-terminal")
                .leaf()
            }))
        },
    ))
}

// ===== NOTIFICATIONS =====

fn notifications(state: &AppState) -> NavNode {
    let state = state.clone();
    NavNode::new(
        "notifications",
        "Notifications",
        Layout::new(move |_ctx: &RouterContext| {
            let pending = state.pending_operations.latest();
            let mut children = vec![View::title("Notifications", "fas fa-bell")];
            if pending.installing.is_empty() && pending.downloading.is_empty() {
                children.push(View::note(NoteLevel::Info, "Nothing is being installed or downloaded."));
            }
            if !pending.installing.is_empty() {
                children.push(View::section(
                    "Installing",
                    pending.installing.iter().map(View::text).collect(),
                ));
            }
            if !pending.downloading.is_empty() {
                children.push(View::section(
                    "Downloading",
                    pending.downloading.iter().map(View::text).collect(),
                ));
            }
            View::column(children)
        }),
    )
    .with_icon("fas fa-bell")
    .leaf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Clients;
    use crate::extension::Extensions;
    use crate::nav::{NavTarget, PageStatus, Router, RouterOptions};
    use futures::future::BoxFuture;
    use shared::RootLogs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn backend(name: &str, uid: &str, partition_id: &str, started_at: u64) -> ProxiedBackend {
        ProxiedBackend {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            uid: uid.to_string(),
            partition_id: partition_id.to_string(),
            started_at,
            port: Some(2001),
        }
    }

    #[test]
    fn instances_sort_by_name_then_start_time() {
        let env = EnvironmentStatus {
            proxied_backends: vec![
                backend("svc", "late", "P~x", 20),
                backend("api", "other", "P~x", 30),
                backend("svc", "early", "P~x", 10),
                backend("svc", "elsewhere", "Q~y", 0),
            ],
            ..EnvironmentStatus::default()
        };
        let uids: Vec<_> = instances(&env, "P~x").iter().map(|backend| backend.uid.as_str()).collect();
        assert_eq!(uids, vec!["other", "early", "late"]);
    }

    #[tokio::test]
    async fn page_and_tree_list_partitions_alike() {
        let env = EnvironmentStatus {
            proxied_backends: vec![
                backend("svc", "u1", "zeta~1", 0),
                backend("svc", "u2", "alpha~9", 0),
                backend("svc", "u3", "zeta~1", 0),
                backend("svc", "u4", "alpha~2", 0),
            ],
            ..EnvironmentStatus::default()
        };
        let state = AppState::new();
        let Resolution::Ready(Some(routes)) = resolve_backends(&state, &env, &[]) else {
            panic!("partitions expected")
        };
        let tree: Vec<_> = routes.keys().map(String::as_str).collect();
        assert_eq!(tree, vec!["alpha~2", "alpha~9", "zeta~1"]);

        let View::Column { children } = partitions_view(&env) else { panic!("column expected") };
        let page: Vec<_> = children[1..]
            .iter()
            .map(|link| match link {
                View::Link { path, .. } => path.trim_start_matches("/environment/backends/").to_string(),
                other => panic!("link expected, got {other:?}"),
            })
            .collect();
        assert_eq!(page, tree);
    }

    #[test]
    fn vanished_backend_renders_notice() {
        let view = backend_view(None, "u1");
        assert!(view.find_note(NoteLevel::Warning).unwrap().contains("no longer running"));
        assert!(backend_view(Some(&backend("svc", "u1", "P~x", 0)), "u1").find_note(NoteLevel::Warning).is_none());
    }

    #[derive(Default)]
    struct CountingLogs {
        calls: AtomicUsize,
    }

    impl LogsClient for CountingLogs {
        fn query_root_logs(&self, max_count: usize) -> BoxFuture<'static, anyhow::Result<RootLogs>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                assert_eq!(max_count, MAX_ROOT_LOGS);
                let entry = |text: &str, timestamp| LogEntry {
                    context_id: format!("ctx-{timestamp}"),
                    level: "INFO".to_string(),
                    text: text.to_string(),
                    timestamp,
                };
                Ok(RootLogs {
                    logs: vec![entry("started", 1), entry(&format!("request #{call}"), 2)],
                })
            })
        }
    }

    #[tokio::test]
    async fn logs_page_queries_the_server_on_each_render() {
        let client = Arc::new(CountingLogs::default());
        let deps = PageDeps {
            state: AppState::new(),
            clients: Clients {
                logs: client.clone(),
                ..Clients::disconnected()
            },
            extensions: Extensions::default(),
        };
        let root = NavNode::new("", "root", Layout::fixed(View::text("root"))).with_routes([navigation(&deps)]);
        let router = Router::new(root, RouterOptions::default());

        let page = router.render(NavTarget::new("/environment/logs")).await;
        assert_eq!(page.status, PageStatus::Found);
        assert_eq!(
            page.content,
            View::column(vec![
                View::title("Logs", "fas fa-bug"),
                View::list(vec![View::text("[INFO] 2 request #0"), View::text("[INFO] 1 started")]),
            ])
        );

        router.render(NavTarget::new("/environment/logs")).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_logs_render_a_notice() {
        assert!(logs_view(&[]).find_note(NoteLevel::Info).is_some());
    }
}
