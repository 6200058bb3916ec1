use futures::stream::{Stream, StreamExt};
use shared::DownMsg;

use crate::dataflow::Actor;
use crate::state::{AppState, book_paths};

/// Create the message processor dispatching server pushes to the state Actors.
pub fn create_connection_message_handler<S>(state: &AppState, down_msg_stream: S) -> Actor<()>
where
    S: Stream<Item = DownMsg> + Send + Unpin + 'static,
{
    let state = state.clone();
    Actor::new((), |_state| async move {
        let mut down_msg_stream = down_msg_stream;
        while let Some(down_msg) = down_msg_stream.next().await {
            handle_down_msg(down_msg, &state);
        }
        log::info!("server connection closed");
    })
}

pub fn handle_down_msg(down_msg: DownMsg, state: &AppState) {
    match down_msg {
        DownMsg::EnvironmentStatus(status) => {
            log::debug!(
                "environment status: {} backend(s), {} ESM server(s)",
                status.proxied_backends.len(),
                status.proxied_esm_servers.len()
            );
            state.mounted.paths_book_received_relay.send(status.paths_book.clone());
            state.environment_received_relay.send(status);
        }
        DownMsg::ProjectsStatus(status) => {
            log::debug!("projects status: {} project(s)", status.projects.len());
            for failure in &status.failures {
                log::warn!("project at `{}` failed to load: {}", failure.path, failure.message);
            }
            state.projects_received_relay.send(status);
        }
        DownMsg::CdnStatus(status) => {
            log::debug!("components status: {} package(s)", status.packages.len());
            state.components_received_relay.send(status);
        }
        DownMsg::SessionDetails(details) => {
            log::debug!("session of `{}`", details.user_info.name);
            state.session_received_relay.send(details);
        }
        DownMsg::PluginsLoaded(plugins) => {
            log::debug!("{} plugin(s) loaded", plugins.len());
            state.plugins_loaded_relay.send(plugins);
        }
        DownMsg::PendingOperations(pending) => {
            state.pending_operations_received_relay.send(pending);
        }
    }
}

/// Dispatch `down_msg` and wait until its snapshot is the latest value of the
/// receiving Actor. Used by one-shot runs that navigate right after loading.
pub async fn apply_down_msg(down_msg: DownMsg, state: &AppState) {
    match down_msg.clone() {
        DownMsg::EnvironmentStatus(status) => {
            handle_down_msg(down_msg, state);
            let book = book_paths(&status.paths_book);
            state
                .mounted
                .paths
                .wait_until(|paths| paths.starts_with(&book))
                .await;
            state.environment.wait_until(|latest| **latest == status).await;
        }
        DownMsg::ProjectsStatus(status) => {
            handle_down_msg(down_msg, state);
            state.projects.wait_until(|latest| **latest == status).await;
        }
        DownMsg::CdnStatus(status) => {
            handle_down_msg(down_msg, state);
            state.components.wait_until(|latest| **latest == status).await;
        }
        DownMsg::SessionDetails(details) => {
            handle_down_msg(down_msg, state);
            state.session.wait_until(|latest| **latest == details).await;
        }
        DownMsg::PluginsLoaded(plugins) => {
            handle_down_msg(down_msg, state);
            state.plugins.wait_until(|latest| **latest == plugins).await;
        }
        DownMsg::PendingOperations(pending) => {
            handle_down_msg(down_msg, state);
            state
                .pending_operations
                .wait_until(|latest| **latest == pending)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use shared::{EnvironmentStatus, PathsBook, PluginInfo};

    #[tokio::test]
    async fn messages_reach_their_domains() {
        let state = AppState::new();
        let (sender, receiver) = mpsc::unbounded();
        let _handler = create_connection_message_handler(&state, receiver);

        sender
            .unbounded_send(DownMsg::PluginsLoaded(vec![PluginInfo {
                name: "@w3lab/plugin".to_string(),
                version: "0.1.0".to_string(),
                description: String::new(),
            }]))
            .unwrap();
        let plugins = state.plugins.wait_until(|plugins| !plugins.is_empty()).await;
        assert_eq!(plugins[0].name, "@w3lab/plugin");
    }

    #[tokio::test]
    async fn applied_environment_is_visible_with_its_mounts() {
        let state = AppState::new();
        let status = EnvironmentStatus {
            paths_book: PathsBook {
                config: "/lab/config.py".to_string(),
                databases: "/lab/databases".to_string(),
                system: "/lab/system".to_string(),
            },
            ..EnvironmentStatus::default()
        };
        apply_down_msg(DownMsg::EnvironmentStatus(status.clone()), &state).await;

        assert_eq!(*state.environment.latest(), status);
        assert_eq!(state.mounted.paths.latest().len(), 3);
    }
}
