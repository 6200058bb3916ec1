//! `/plugins`: one subtree per loaded plugin, built by the plugin itself.

use shared::PluginInfo;
use std::collections::HashMap;
use std::sync::Arc;

use super::PageDeps;
use crate::extension::PluginRegistry;
use crate::grouping::skip_namespace;
use crate::nav::{Content, LazyBranch, Layout, NavNode, Resolution, RouterContext};
use crate::view::{NoteLevel, View};

pub fn navigation(deps: &PageDeps) -> NavNode {
    let state = deps.state.clone();
    let registry = deps.extensions.plugins.clone();
    NavNode::new(
        "plugins",
        "Plugins",
        Layout::new(move |_ctx: &RouterContext| {
            let plugins = state.plugins.latest();
            let mut children = vec![View::title("Plugins", "fas fa-puzzle-piece")];
            if plugins.is_empty() {
                children.push(View::note(NoteLevel::Info, "No plugin is loaded."));
            }
            children.extend(plugins.iter().map(|plugin| {
                View::link(
                    format!("{}#{}", plugin.name, plugin.version),
                    format!("/plugins/{}", skip_namespace(&plugin.name)),
                )
            }));
            View::column(children)
        }),
    )
    .with_icon("fas fa-puzzle-piece")
    .with_lazy(LazyBranch::new(
        deps.state.plugins.clone(),
        move |plugins: &Arc<Vec<PluginInfo>>, residual: &[String], _ctx: &RouterContext| {
            if !residual.is_empty() {
                return Resolution::none();
            }
            Resolution::children(plugin_nodes(&registry, plugins))
        },
    ))
}

/// One subtree per plugin; the first plugin claiming a segment keeps it.
fn plugin_nodes(registry: &PluginRegistry, plugins: &[PluginInfo]) -> Vec<NavNode> {
    let mut mounted: HashMap<String, &str> = HashMap::new();
    let mut nodes = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        let id = skip_namespace(&plugin.name).to_string();
        if let Some(first) = mounted.get(&id) {
            log::warn!(
                "plugin `{}` skipped: `/plugins/{id}` is already mounted by `{first}`",
                plugin.name
            );
            continue;
        }
        mounted.insert(id, plugin.name.as_str());
        nodes.push(plugin_node(registry, plugin));
    }
    nodes
}

fn plugin_node(registry: &PluginRegistry, plugin: &PluginInfo) -> NavNode {
    let id = skip_namespace(&plugin.name).to_string();
    let Some(contributed) = registry.plugin(&plugin.name) else {
        let info = plugin.clone();
        return NavNode::new(
            id.clone(),
            id,
            Layout::new(move |_ctx: &RouterContext| {
                Content::Ready(View::column(vec![
                    View::title(info.name.clone(), "fas fa-puzzle-piece"),
                    View::markdown(info.description.clone()),
                    View::note(
                        NoteLevel::Warning,
                        format!("Plugin `{}` does not provide a page.", info.name),
                    ),
                ]))
            }),
        )
        .with_icon("fas fa-puzzle-piece")
        .leaf();
    };
    let mut node = contributed.navigation(&format!("/plugins/{id}"));
    node.id = id;
    if node.header.is_none() {
        node = node.with_icon("fas fa-puzzle-piece");
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::extension;
    use crate::nav::{NavTarget, PageStatus, Router, RouterOptions};

    fn plugin(name: &str) -> PluginInfo {
        PluginInfo {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            description: String::new(),
        }
    }

    fn plugins_root(registry: &PluginRegistry, plugins: &[PluginInfo]) -> Router {
        let root = NavNode::new("", "root", Layout::fixed(View::text("root")))
            .with_routes([NavNode::new("plugins", "Plugins", Layout::fixed(View::text("plugins")))
                .with_routes(plugin_nodes(registry, plugins))]);
        Router::new(root, RouterOptions::default())
    }

    #[tokio::test]
    async fn registered_plugin_renders_its_own_page() {
        let mut registry = PluginRegistry::default();
        registry.register_page(
            "@w3lab/cache",
            extension(|ctx: RouterContext| async move {
                Ok(View::text(format!("cache at {}", ctx.target.path)))
            }),
        );
        let router = plugins_root(&registry, &[plugin("@w3lab/cache"), plugin("@w3lab/bare")]);

        let page = router.render(NavTarget::new("/plugins/cache")).await;
        assert_eq!(page.content, View::text("cache at /plugins/cache"));

        let bare = router.render(NavTarget::new("/plugins/bare")).await;
        assert!(bare.content.find_note(NoteLevel::Warning).is_some());
    }

    #[tokio::test]
    async fn plugin_contributes_child_routes() {
        let mut registry = PluginRegistry::default();
        registry.register(
            "@w3lab/stats",
            Arc::new(|base_path: &str| {
                let overview = format!("overview of {base_path}");
                NavNode::new("ignored", "Stats", Layout::fixed(View::text(overview))).with_routes([
                    NavNode::new("daily", "Daily", Layout::fixed(View::text("daily"))).leaf(),
                ])
            }),
        );
        let router = plugins_root(&registry, &[plugin("@w3lab/stats")]);

        let root = router.render(NavTarget::new("/plugins/stats")).await;
        assert_eq!(root.status, PageStatus::Found);
        assert_eq!(root.content, View::text("overview of /plugins/stats"));

        let child = router.render(NavTarget::new("/plugins/stats/daily")).await;
        assert_eq!(child.status, PageStatus::Found);
        assert_eq!(child.content, View::text("daily"));
    }

    #[test]
    fn first_plugin_keeps_a_shared_segment() {
        let nodes = plugin_nodes(
            &PluginRegistry::default(),
            &[plugin("@w3lab/cache"), plugin("@other/cache"), plugin("@w3lab/stats")],
        );
        let ids: Vec<_> = nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["cache", "stats"]);
        assert_eq!(nodes[0].name, "cache");
    }
}
