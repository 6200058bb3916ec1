//! Navigation badges of the top banner: what is serving, what is in flight.

use futures_signals::map_ref;
use futures_signals::signal::Signal;
use serde::Serialize;
use shared::{EnvironmentStatus, PendingOperations};

use crate::state::AppState;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub icon: &'static str,
    pub tooltip: String,
    pub count: usize,
    /// Environment page the badge links to.
    pub path: &'static str,
}

/// Badges worth showing; empty categories are left out.
pub fn nav_badges(env: &EnvironmentStatus, pending: &PendingOperations) -> Vec<Badge> {
    let backends = env.proxied_backends.len();
    let esm_servers = env.proxied_esm_servers.len();
    let installs = pending.installing.len();
    let downloads = pending.downloading.len();
    [
        Badge {
            id: "backends",
            icon: "fas fa-server",
            tooltip: format!("{backends} backend(s) serving"),
            count: backends,
            path: "/environment/backends",
        },
        Badge {
            id: "esm-servers",
            icon: "fab fa-js",
            tooltip: format!("{esm_servers} ESM server(s) serving"),
            count: esm_servers,
            path: "/environment/esm-servers",
        },
        Badge {
            id: "installing",
            icon: "fas fa-plug",
            tooltip: format!("{installs} install(s) in progress"),
            count: installs,
            path: "/environment/notifications",
        },
        Badge {
            id: "downloading",
            icon: "fas fa-download",
            tooltip: format!("{downloads} download(s) in progress"),
            count: downloads,
            path: "/environment/notifications",
        },
    ]
    .into_iter()
    .filter(|badge| badge.count > 0)
    .collect()
}

pub fn badges_signal(state: &AppState) -> impl Signal<Item = Vec<Badge>> + Send + use<> {
    map_ref! {
        let env = state.environment.signal(),
        let pending = state.pending_operations.signal() => nav_badges(env, pending)
    }
}

pub fn badges_view(badges: &[Badge]) -> View {
    View::list(
        badges
            .iter()
            .map(|badge| View::link(badge.tooltip.clone(), badge.path))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures_signals::signal::SignalExt;

    #[test]
    fn idle_environment_has_no_badges() {
        assert!(nav_badges(&EnvironmentStatus::default(), &PendingOperations::default()).is_empty());
    }

    #[tokio::test]
    async fn badges_follow_pending_operations() {
        let state = AppState::new();
        let mut badges = badges_signal(&state).to_stream();
        assert_eq!(badges.next().await, Some(Vec::new()));

        state.pending_operations_received_relay.send(PendingOperations {
            installing: vec!["svc#1.0.0".to_string()],
            downloading: Vec::new(),
        });
        let badges = badges.next().await.unwrap_or_default();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].id, "installing");
        assert_eq!(badges[0].path, "/environment/notifications");
    }
}
