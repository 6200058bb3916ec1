//! `/mounted`: host folders and files exposed by the user or the paths book.
//!
//! A folder page browses below its root through the `target` parameter, which
//! holds the encoded sub-path (`file_`-prefixed when it points at a file).

use shared::{FolderContent, MountedKind, MountedPath};
use std::sync::Arc;

use super::{PageDeps, gone_view};
use crate::clients::FolderClient;
use crate::nav::{Content, LazyBranch, Layout, NavNode, NavTarget, Resolution, RouterContext};
use crate::path_codec;
use crate::state::{MountedPaths, mounted_id};
use crate::view::{NoteLevel, View};

const FILE_PREFIX: &str = "file_";

pub fn navigation(deps: &PageDeps) -> NavNode {
    let mounted = deps.state.mounted.clone();
    let folders = deps.clients.folders.clone();
    NavNode::new(
        "mounted",
        "Mounted",
        Layout::new(move |_ctx: &RouterContext| overview(&mounted)),
    )
    .with_icon("fas fa-hdd")
    .with_lazy(LazyBranch::new(
        deps.state.mounted.paths.clone(),
        move |paths: &Arc<Vec<MountedPath>>, residual: &[String], _ctx: &RouterContext| {
            if !residual.is_empty() {
                return Resolution::none();
            }
            Resolution::children(paths.iter().map(|mounted| mounted_node(&folders, mounted)))
        },
    ))
}

fn overview(mounted: &MountedPaths) -> View {
    let paths = mounted.paths.latest();
    let mut children = vec![View::title("Mounted", "fas fa-hdd")];
    if paths.is_empty() {
        children.push(View::note(NoteLevel::Info, "No folder is mounted."));
    }
    children.extend(paths.iter().map(|mounted| {
        View::link(mounted.path.clone(), format!("/mounted/{}", mounted_id(mounted)))
    }));
    View::column(children)
}

fn mounted_node(folders: &Arc<dyn FolderClient>, mounted: &MountedPath) -> NavNode {
    let folders = folders.clone();
    let root = mounted.clone();
    let icon = match mounted.kind {
        MountedKind::Folder => "fas fa-folder",
        MountedKind::File => "fas fa-file",
    };
    NavNode::new(
        mounted_id(mounted),
        mounted.base_name(),
        Layout::new(move |ctx: &RouterContext| {
            Content::pending(mounted_content(
                folders.clone(),
                root.clone(),
                ctx.parameter("target").map(str::to_string),
            ))
        }),
    )
    .with_icon(icon)
    .leaf()
}

async fn mounted_content(
    folders: Arc<dyn FolderClient>,
    root: MountedPath,
    target: Option<String>,
) -> anyhow::Result<View> {
    if root.kind == MountedKind::File {
        return Ok(file_view(&root.path));
    }
    let target = target.unwrap_or_default();
    if let Some(token) = target.strip_prefix(FILE_PREFIX) {
        let relative = path_codec::decode(token)?;
        return Ok(file_view(&join(&root.path, &relative)));
    }
    let relative = path_codec::decode(&target)?;
    let folder = join(&root.path, &relative);
    log::debug!("listing mounted folder `{folder}`");
    let content = folders.query_folder_content(&folder).await?;
    Ok(folder_view(&root, &relative, &folder, &content))
}

fn join(root: &str, relative: &str) -> String {
    if relative.is_empty() {
        return root.to_string();
    }
    format!("{}/{}", root.trim_end_matches('/'), relative.trim_start_matches('/'))
}

fn file_view(path: &str) -> View {
    let name = path.rsplit('/').next().unwrap_or(path);
    View::column(vec![View::title(name, "fas fa-file"), View::field("Path", path)])
}

fn folder_view(root: &MountedPath, relative: &str, folder: &str, content: &FolderContent) -> View {
    if content.folders.is_empty() && content.files.is_empty() {
        return gone_view(folder, "fas fa-folder-open", format!("Folder `{folder}` is empty or no longer exists."));
    }
    let base = format!("/mounted/{}", mounted_id(root));
    let link = |name: &str, prefix: &str| {
        let sub_path = join(relative, name);
        NavTarget::new(&base)
            .with_parameter("target", format!("{prefix}{}", path_codec::encode(&sub_path)))
            .to_url()
    };
    let mut entries: Vec<View> = content
        .folders
        .iter()
        .map(|name| View::link(format!("{name}/"), link(name, "")))
        .collect();
    entries.extend(content.files.iter().map(|name| View::link(name.clone(), link(name, FILE_PREFIX))));
    View::column(vec![
        View::title(folder, "fas fa-folder-open"),
        View::list(entries),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFolders {
        requests: Mutex<Vec<String>>,
    }

    impl FolderClient for RecordingFolders {
        fn query_folder_content(&self, path: &str) -> BoxFuture<'static, anyhow::Result<FolderContent>> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(path.to_string());
            }
            Box::pin(async {
                Ok(FolderContent {
                    folders: vec!["src".to_string()],
                    files: vec!["Cargo.toml".to_string()],
                })
            })
        }
    }

    #[tokio::test]
    async fn targets_browse_below_the_mounted_root() {
        let recording = Arc::new(RecordingFolders::default());
        let folders: Arc<dyn FolderClient> = recording.clone();
        let root = MountedPath::folder("/home/me/repo");

        let view = mounted_content(folders.clone(), root.clone(), None).await.unwrap();
        let View::Column { children } = &view else { panic!("column expected") };
        let View::List { items } = &children[1] else { panic!("listing expected") };
        let expected = format!("/mounted/{}?target={}", mounted_id(&root), path_codec::encode("src"));
        assert_eq!(items[0], View::link("src/", expected));

        let token = path_codec::encode("src");
        mounted_content(folders.clone(), root.clone(), Some(token)).await.unwrap();

        let file_target = format!("file_{}", path_codec::encode("src/main.rs"));
        let file = mounted_content(folders, root, Some(file_target)).await.unwrap();
        assert_eq!(
            file,
            View::column(vec![View::title("main.rs", "fas fa-file"), View::field("Path", "/home/me/repo/src/main.rs")])
        );

        let requests = recording.requests.lock().unwrap().clone();
        assert_eq!(requests, vec!["/home/me/repo".to_string(), "/home/me/repo/src".to_string()]);
    }

    #[tokio::test]
    async fn undecodable_target_fails_the_page() {
        let folders: Arc<dyn FolderClient> = Arc::new(RecordingFolders::default());
        let result = mounted_content(folders, MountedPath::folder("/data"), Some("%%%".to_string())).await;
        assert!(result.is_err());
    }
}
