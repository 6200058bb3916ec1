//! LabApp - Self-contained application root wiring state, router and panes

use futures::stream::Stream;
use shared::{DownMsg, LabConfig, MountedKind, MountedPath};
use std::sync::Arc;

use crate::clients::Clients;
use crate::connection::create_connection_message_handler;
use crate::dataflow::Actor;
use crate::extension::Extensions;
use crate::nav::{
    AddressBar, Bookmarks, Companion, KeyValueStore, MemoryHistory, MemoryStore, NavError, Page,
    Router, RouterOptions,
};
use crate::pages::{PageDeps, lab_tree, legacy_redirect, projects};
use crate::state::{AppState, mounted_nav};

/// Collaborators supplied by the host (browser shell, console, tests).
#[derive(Clone)]
pub struct Services {
    pub clients: Clients,
    pub extensions: Extensions,
    pub store: Arc<dyn KeyValueStore>,
    pub address_bar: Arc<dyn AddressBar>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            clients: Clients::disconnected(),
            extensions: Extensions::default(),
            store: Arc::new(MemoryStore::default()),
            address_bar: Arc::new(MemoryHistory::default()),
        }
    }
}

/// Self-contained W3Lab application
#[derive(Clone)]
pub struct LabApp {
    /// Server-pushed snapshots, one Actor per domain
    pub state: AppState,

    /// Primary navigation over the lab tree
    pub router: Router,

    // === UI STATE (persisted through the key-value store) ===
    /// Paths opened side by side with the primary page
    pub companion: Companion,

    pub bookmarks: Bookmarks,
}

impl LabApp {
    /// Must be called from within a tokio runtime.
    pub fn new(config: &LabConfig, services: Services) -> Self {
        let state = AppState::new();
        let deps = PageDeps {
            state: state.clone(),
            clients: services.clients,
            extensions: services.extensions,
        };
        let options = RouterOptions::from_config(&config.router)
            .with_redirect(legacy_redirect())
            .with_address_bar(services.address_bar);
        let router = Router::new(lab_tree(&deps), options);
        let companion = Companion::persisted(config.router.companion_mode, services.store.clone());
        let bookmarks = Bookmarks::persisted(&config.bookmarks, services.store);
        log::info!("lab initialized, companion mode {:?}", config.router.companion_mode);
        Self {
            state,
            router,
            companion,
            bookmarks,
        }
    }

    /// Feed server pushes into the state Actors.
    pub fn connect<S>(&self, down_msg_stream: S) -> Actor<()>
    where
        S: Stream<Item = DownMsg> + Send + Unpin + 'static,
    {
        create_connection_message_handler(&self.state, down_msg_stream)
    }

    /// Expose a host path under `/mounted` and open it once the branch lists it.
    pub async fn mount_hd_path(&self, path: &str, kind: MountedKind) -> Result<Page, NavError> {
        let mounted = MountedPath {
            path: path.to_string(),
            kind,
        };
        let nav = mounted_nav(&mounted);
        if self.state.mounted.contains(path) {
            return self.router.fire_navigate_to(nav.as_str()).await;
        }
        log::info!("mounting `{path}`");
        self.state.mounted.path_mounted_relay.send(mounted);
        self.router.navigate_when_available(&nav).await
    }

    pub fn unmount_hd_path(&self, path: &str) {
        log::info!("unmounting `{path}`");
        self.state.mounted.path_unmounted_relay.send(path.to_string());
    }

    /// Navigation path of a local project, `None` when no finder holds it.
    pub fn project_nav(&self, name: &str, version: Option<&str>) -> Option<String> {
        projects::project_nav(&self.state, name, version)
    }
}
