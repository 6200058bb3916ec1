//! `/explorer`: drives of the session groups, browsed through the `target`
//! parameter (`folder_<id>`, `item_<id>`, `trash_`).

use anyhow::anyhow;
use shared::{ExplorerChildren, ExplorerItem, Group, SessionDetails};
use std::sync::Arc;

use super::PageDeps;
use crate::clients::ExplorerClient;
use crate::nav::{Content, LazyBranch, Layout, NavNode, NavTarget, Resolution, RouterContext, route_map};
use crate::view::{NoteLevel, View};

const FOLDER_PREFIX: &str = "folder_";
const ITEM_PREFIX: &str = "item_";
const TRASH_TARGET: &str = "trash_";

pub fn navigation(deps: &PageDeps) -> NavNode {
    let state = deps.state.clone();
    let client = deps.clients.explorer.clone();
    NavNode::new(
        "explorer",
        "Explorer",
        Layout::new(move |_ctx: &RouterContext| {
            let session = state.session.latest();
            let mut children = vec![View::title("Explorer", "fas fa-folder")];
            if session.user_info.groups.is_empty() {
                children.push(View::note(NoteLevel::Info, "Pick a group to browse its drive."));
            }
            children.extend(session.user_info.groups.iter().map(|group| {
                View::link(group.short_name(), format!("/explorer/{}", group.id))
            }));
            View::column(children)
        }),
    )
    .with_icon("fas fa-folder")
    .with_lazy(LazyBranch::new(
        deps.state.session.clone(),
        move |_session: &Arc<SessionDetails>, residual: &[String], _ctx: &RouterContext| {
            if !residual.is_empty() {
                return Resolution::none();
            }
            let client = client.clone();
            Resolution::pending(async move {
                let session = client.session_details().await?;
                let nodes = session
                    .user_info
                    .groups
                    .iter()
                    .map(|group| group_node(&client, group))
                    .collect::<Vec<_>>();
                Ok(Some(route_map(nodes)))
            })
        },
    ))
}

fn group_node(client: &Arc<dyn ExplorerClient>, group: &Group) -> NavNode {
    let client = client.clone();
    let group_id = group.id.clone();
    let icon = if group.is_private() { "fas fa-user" } else { "fas fa-users" };
    NavNode::new(
        group.id.clone(),
        group.short_name(),
        Layout::new(move |ctx: &RouterContext| {
            Content::pending(drive_content(
                client.clone(),
                group_id.clone(),
                ctx.parameter("target").map(str::to_string),
            ))
        })
        .with_toc(|_ctx: &RouterContext| View::list(Vec::new())),
    )
    .with_icon(icon)
    .leaf()
}

async fn drive_content(
    client: Arc<dyn ExplorerClient>,
    group_id: String,
    target: Option<String>,
) -> anyhow::Result<View> {
    let target = target.unwrap_or_default();
    if let Some(item_id) = target.strip_prefix(ITEM_PREFIX) {
        let item = client.get_item(item_id).await?;
        return Ok(item_view(&item));
    }
    let drive = client.default_drive(&group_id).await?;
    if target.is_empty() {
        let children = client.query_children(&drive.drive_id).await?;
        Ok(folder_view(&group_id, "Drive", &children))
    } else if target == TRASH_TARGET {
        let deleted = client.query_deleted(&drive.drive_id).await?;
        Ok(folder_view(&group_id, "Trash", &deleted))
    } else if let Some(folder_id) = target.strip_prefix(FOLDER_PREFIX) {
        let children = client.query_children(folder_id).await?;
        Ok(folder_view(&group_id, folder_id, &children))
    } else {
        Err(anyhow!("unknown explorer target `{target}`"))
    }
}

fn target_link(group_id: &str, target: String) -> String {
    NavTarget::new(&format!("/explorer/{group_id}"))
        .with_parameter("target", target)
        .to_url()
}

fn folder_view(group_id: &str, title: &str, children: &ExplorerChildren) -> View {
    let mut entries: Vec<View> = children
        .folders
        .iter()
        .map(|folder| View::link(folder.name.clone(), target_link(group_id, format!("{FOLDER_PREFIX}{}", folder.folder_id))))
        .collect();
    entries.extend(children.items.iter().map(|item| {
        View::link(item.name.clone(), target_link(group_id, format!("{ITEM_PREFIX}{}", item.item_id)))
    }));
    let mut column = vec![View::title(title, "fas fa-folder-open"), View::list(entries)];
    if title != "Trash" {
        column.push(View::link("Trash", target_link(group_id, TRASH_TARGET.to_string())));
    }
    View::column(column)
}

fn item_view(item: &ExplorerItem) -> View {
    View::column(vec![
        View::title(item.name.clone(), "fas fa-file"),
        View::field("Kind", item.kind.clone()),
        View::field("Asset", item.asset_id.clone()),
        View::field("Item", item.item_id.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use shared::{DefaultDrive, ExplorerFolder};

    struct FakeExplorer;

    impl ExplorerClient for FakeExplorer {
        fn session_details(&self) -> BoxFuture<'static, anyhow::Result<SessionDetails>> {
            Box::pin(async { Ok(SessionDetails::default()) })
        }

        fn default_drive(&self, group_id: &str) -> BoxFuture<'static, anyhow::Result<DefaultDrive>> {
            let group_id = group_id.to_string();
            Box::pin(async move {
                Ok(DefaultDrive {
                    drive_id: format!("drive-{group_id}"),
                    group_id,
                })
            })
        }

        fn query_children(&self, parent_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerChildren>> {
            let name = format!("in-{parent_id}");
            Box::pin(async move {
                Ok(ExplorerChildren {
                    folders: vec![ExplorerFolder {
                        folder_id: "f1".to_string(),
                        name,
                    }],
                    items: Vec::new(),
                })
            })
        }

        fn query_deleted(&self, _drive_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerChildren>> {
            Box::pin(async { Ok(ExplorerChildren::default()) })
        }

        fn get_item(&self, item_id: &str) -> BoxFuture<'static, anyhow::Result<ExplorerItem>> {
            let item_id = item_id.to_string();
            Box::pin(async move {
                Ok(ExplorerItem {
                    asset_id: format!("asset-{item_id}"),
                    item_id,
                    name: "notes.md".to_string(),
                    kind: "data".to_string(),
                })
            })
        }
    }

    #[tokio::test]
    async fn target_parameter_selects_the_listing() {
        let client: Arc<dyn ExplorerClient> = Arc::new(FakeExplorer);

        let drive = drive_content(client.clone(), "g1".to_string(), None).await.unwrap();
        let View::Column { children } = &drive else { panic!("column expected") };
        assert_eq!(
            children[1],
            View::list(vec![View::link("in-drive-g1", "/explorer/g1?target=folder_f1")])
        );

        let folder = drive_content(client.clone(), "g1".to_string(), Some("folder_f1".to_string()))
            .await
            .unwrap();
        assert!(matches!(&folder, View::Column { children } if children[0] == View::title("f1", "fas fa-folder-open")));

        let item = drive_content(client.clone(), "g1".to_string(), Some("item_i1".to_string()))
            .await
            .unwrap();
        assert!(matches!(&item, View::Column { children } if children[0] == View::title("notes.md", "fas fa-file")));

        assert!(drive_content(client, "g1".to_string(), Some("bogus".to_string())).await.is_err());
    }
}
