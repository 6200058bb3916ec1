//! HTTP collaborators the page branches fetch through.
//!
//! Every call must build a fresh request: two concurrent listings of the same
//! folder never share one request object.

use futures::future::BoxFuture;
use shared::{DefaultDrive, ExplorerChildren, ExplorerItem, FolderContent, RootLogs, SessionDetails};
use std::sync::Arc;

pub trait FolderClient: Send + Sync {
    /// Listing of a host folder, through the local server.
    fn query_folder_content(&self, path: &str) -> BoxFuture<'static, anyhow::Result<FolderContent>>;
}

pub trait ExplorerClient: Send + Sync {
    fn session_details(&self) -> BoxFuture<'static, anyhow::Result<SessionDetails>>;

    fn default_drive(&self, group_id: &str) -> BoxFuture<'static, anyhow::Result<DefaultDrive>>;

    fn query_children(&self, parent_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerChildren>>;

    fn query_deleted(&self, drive_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerChildren>>;

    fn get_item(&self, item_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerItem>>;
}

pub trait LogsClient: Send + Sync {
    /// Latest root logs, newest first, at most `max_count` of them.
    fn query_root_logs(&self, max_count: usize) -> BoxFuture<'static, anyhow::Result<RootLogs>>;
}

#[derive(Clone)]
pub struct Clients {
    pub folders: Arc<dyn FolderClient>,
    pub explorer: Arc<dyn ExplorerClient>,
    pub logs: Arc<dyn LogsClient>,
}

impl Clients {
    /// Clients failing every call, for runs without a server.
    pub fn disconnected() -> Self {
        Self {
            folders: Arc::new(Disconnected),
            explorer: Arc::new(Disconnected),
            logs: Arc::new(Disconnected),
        }
    }
}

struct Disconnected;

fn not_connected<T>(operation: &str) -> BoxFuture<'static, anyhow::Result<T>> {
    let message = format!("{operation}: not connected to the local server");
    Box::pin(async move { Err(anyhow::anyhow!(message)) })
}

impl FolderClient for Disconnected {
    fn query_folder_content(&self, _path: &str) -> BoxFuture<'static, anyhow::Result<FolderContent>> {
        not_connected("folder content")
    }
}

impl ExplorerClient for Disconnected {
    fn session_details(&self) -> BoxFuture<'static, anyhow::Result<SessionDetails>> {
        not_connected("session details")
    }

    fn default_drive(&self, _group_id: &str) -> BoxFuture<'static, anyhow::Result<DefaultDrive>> {
        not_connected("default drive")
    }

    fn query_children(&self, _parent_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerChildren>> {
        not_connected("explorer children")
    }

    fn query_deleted(&self, _drive_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerChildren>> {
        not_connected("explorer trash")
    }

    fn get_item(&self, _item_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerItem>> {
        not_connected("explorer item")
    }
}

impl LogsClient for Disconnected {
    fn query_root_logs(&self, _max_count: usize) -> BoxFuture<'static, anyhow::Result<RootLogs>> {
        not_connected("root logs")
    }
}
