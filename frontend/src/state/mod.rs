//! Server-pushed state, one replay-latest Actor per domain.
//!
//! Each `DownMsg` carries a full snapshot; the Actors replace their value
//! wholesale. Page branches read them through `latest()` or subscribe to them
//! as lazy branch sources.

mod mounted;

pub use mounted::{MountedPaths, mounted_id, mounted_nav};
pub(crate) use mounted::book_paths;

use futures::StreamExt;
use shared::{
    CdnPackage, CdnStatus, EnvironmentStatus, PendingOperations, PluginInfo, Project,
    ProjectsStatus, ProxiedBackend, ProxiedEsmServer, SessionDetails,
};
use std::sync::Arc;

use crate::dataflow::{Actor, Relay, relay};

#[derive(Clone, Debug)]
pub struct AppState {
    pub environment: Actor<Arc<EnvironmentStatus>>,
    pub pending_operations: Actor<Arc<PendingOperations>>,
    pub projects: Actor<Arc<ProjectsStatus>>,
    pub components: Actor<Arc<CdnStatus>>,
    pub session: Actor<Arc<SessionDetails>>,
    pub plugins: Actor<Arc<Vec<PluginInfo>>>,
    pub mounted: MountedPaths,

    // === EVENT-SOURCE RELAYS (server pushes) ===
    pub environment_received_relay: Relay<EnvironmentStatus>,
    pub pending_operations_received_relay: Relay<PendingOperations>,
    pub projects_received_relay: Relay<ProjectsStatus>,
    pub components_received_relay: Relay<CdnStatus>,
    pub session_received_relay: Relay<SessionDetails>,
    pub plugins_loaded_relay: Relay<Vec<PluginInfo>>,
}

/// Actor holding the latest snapshot sent through the returned relay.
fn snapshot_actor<T>(initial: T) -> (Relay<T>, Actor<Arc<T>>)
where
    T: Send + Sync + 'static,
{
    let (received_relay, mut received_stream) = relay();
    let actor = Actor::new(Arc::new(initial), |state| async move {
        while let Some(snapshot) = received_stream.next().await {
            state.set(Arc::new(snapshot));
        }
    });
    (received_relay, actor)
}

impl AppState {
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (environment_received_relay, environment) = snapshot_actor(EnvironmentStatus::default());
        let (pending_operations_received_relay, pending_operations) =
            snapshot_actor(PendingOperations::default());
        let (projects_received_relay, projects) = snapshot_actor(ProjectsStatus::default());
        let (components_received_relay, components) = snapshot_actor(CdnStatus::default());
        let (session_received_relay, session) = snapshot_actor(SessionDetails::default());
        let (plugins_loaded_relay, plugins) = snapshot_actor(Vec::new());

        Self {
            environment,
            pending_operations,
            projects,
            components,
            session,
            plugins,
            mounted: MountedPaths::new(),
            environment_received_relay,
            pending_operations_received_relay,
            projects_received_relay,
            components_received_relay,
            session_received_relay,
            plugins_loaded_relay,
        }
    }

    pub fn backend(&self, uid: &str) -> Option<ProxiedBackend> {
        self.environment
            .latest()
            .proxied_backends
            .iter()
            .find(|backend| backend.uid == uid)
            .cloned()
    }

    pub fn esm_server(&self, uid: &str) -> Option<ProxiedEsmServer> {
        self.environment
            .latest()
            .proxied_esm_servers
            .iter()
            .find(|server| server.uid == uid)
            .cloned()
    }

    pub fn project(&self, id: &str) -> Option<Project> {
        self.projects
            .latest()
            .projects
            .iter()
            .find(|project| project.id == id)
            .cloned()
    }

    pub fn package(&self, id: &str) -> Option<CdnPackage> {
        self.components
            .latest()
            .packages
            .iter()
            .find(|package| package.id == id)
            .cloned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
