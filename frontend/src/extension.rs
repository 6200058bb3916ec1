//! Runtime extension points: custom home page and plugin subtrees.
//!
//! How an extension was sourced (user script, installed package) is not the
//! router's business; it only sees something producing a view from a context.

use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use crate::grouping::skip_namespace;
use crate::nav::{Content, Layout, NavNode, RouterContext};
use crate::view::View;

pub trait Extension: Send + Sync {
    fn render(&self, ctx: &RouterContext) -> BoxFuture<'static, anyhow::Result<View>>;
}

struct FnExtension<F>(F);

impl<F, Fut> Extension for FnExtension<F>
where
    F: Fn(RouterContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<View>> + Send + 'static,
{
    fn render(&self, ctx: &RouterContext) -> BoxFuture<'static, anyhow::Result<View>> {
        (self.0)(ctx.clone()).boxed()
    }
}

pub fn extension<F, Fut>(render: F) -> Arc<dyn Extension>
where
    F: Fn(RouterContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<View>> + Send + 'static,
{
    Arc::new(FnExtension(render))
}

/// Navigation a plugin contributes to the lab tree.
pub trait Plugin: Send + Sync {
    /// Subtree mounted at `base_path`. The root's id is replaced by the
    /// segment the plugin is mounted under.
    fn navigation(&self, base_path: &str) -> NavNode;
}

impl<F> Plugin for F
where
    F: Fn(&str) -> NavNode + Send + Sync,
{
    fn navigation(&self, base_path: &str) -> NavNode {
        self(base_path)
    }
}

/// Plugin rendering a single page, without child routes.
struct PagePlugin {
    name: String,
    page: Arc<dyn Extension>,
}

impl Plugin for PagePlugin {
    fn navigation(&self, _base_path: &str) -> NavNode {
        let page = self.page.clone();
        let name = skip_namespace(&self.name);
        NavNode::new(
            name,
            name,
            Layout::new(move |ctx: &RouterContext| Content::Pending(page.render(ctx))),
        )
        .leaf()
    }
}

/// Plugins by plugin name, as reported by the plugins loader.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn register(&mut self, name: impl Into<String>, plugin: Arc<dyn Plugin>) {
        self.plugins.insert(name.into(), plugin);
    }

    pub fn register_page(&mut self, name: impl Into<String>, page: Arc<dyn Extension>) {
        let name = name.into();
        let plugin = Arc::new(PagePlugin { name: name.clone(), page });
        self.plugins.insert(name, plugin);
    }

    pub fn plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }
}

/// Extensions plugged into the lab tree.
#[derive(Clone, Default)]
pub struct Extensions {
    pub home: Option<Arc<dyn Extension>>,
    pub plugins: PluginRegistry,
}
