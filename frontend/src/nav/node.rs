//! Navigation tree nodes.

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::{LazyRoutes, RouterContext};
use crate::view::View;

/// Children of a node keyed by path segment, in display order.
pub type RouteMap = IndexMap<String, NavNode>;

type ViewFn = Arc<dyn Fn(&RouterContext) -> Content + Send + Sync>;

/// Page body produced by a layout, either at once or after a fetch.
pub enum Content {
    Ready(View),
    Pending(BoxFuture<'static, anyhow::Result<View>>),
}

impl Content {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<View>> + Send + 'static,
    {
        Content::Pending(Box::pin(future))
    }

    pub async fn into_view(self) -> anyhow::Result<View> {
        match self {
            Content::Ready(view) => Ok(view),
            Content::Pending(future) => future.await,
        }
    }
}

impl From<View> for Content {
    fn from(view: View) -> Self {
        Content::Ready(view)
    }
}

/// How a node renders once it becomes the active page.
#[derive(Clone)]
pub struct Layout {
    content: ViewFn,
    toc: Option<ViewFn>,
}

impl Layout {
    pub fn new<F, C>(content: F) -> Self
    where
        F: Fn(&RouterContext) -> C + Send + Sync + 'static,
        C: Into<Content>,
    {
        Self {
            content: Arc::new(move |ctx: &RouterContext| content(ctx).into()),
            toc: None,
        }
    }

    /// Layout whose content never depends on the navigation context.
    pub fn fixed(view: View) -> Self {
        Self::new(move |_| view.clone())
    }

    pub fn with_toc<F, C>(mut self, toc: F) -> Self
    where
        F: Fn(&RouterContext) -> C + Send + Sync + 'static,
        C: Into<Content>,
    {
        self.toc = Some(Arc::new(move |ctx: &RouterContext| toc(ctx).into()));
        self
    }

    pub fn content(&self, ctx: &RouterContext) -> Content {
        (self.content)(ctx)
    }

    pub fn table_of_contents(&self, ctx: &RouterContext) -> Option<Content> {
        self.toc.as_ref().map(|toc| toc(ctx))
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("toc", &self.toc.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavHeader {
    pub icon: Option<String>,
    pub actions: Vec<HeaderAction>,
}

/// Button attached to a node header (refresh, split view, edit).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderAction {
    pub id: String,
    pub icon: String,
    pub tooltip: String,
}

#[derive(Clone)]
pub enum Children {
    Static(RouteMap),
    Lazy(Arc<dyn LazyRoutes>),
    /// Produced by the enclosing lazy branch with a longer residual path.
    Inherit,
    Leaf,
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::Static(routes) => f
                .debug_tuple("Static")
                .field(&routes.keys().collect::<Vec<_>>())
                .finish(),
            Children::Lazy(_) => f.write_str("Lazy"),
            Children::Inherit => f.write_str("Inherit"),
            Children::Leaf => f.write_str("Leaf"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavNode {
    /// Path segment reaching this node from its parent.
    pub id: String,
    pub name: String,
    pub header: Option<NavHeader>,
    pub layout: Layout,
    pub children: Children,
}

impl NavNode {
    /// Node whose children come from the enclosing lazy branch.
    pub fn new(id: impl Into<String>, name: impl Into<String>, layout: Layout) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            header: None,
            layout,
            children: Children::Inherit,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.header.get_or_insert_with(NavHeader::default).icon = Some(icon.to_string());
        self
    }

    pub fn with_action(mut self, action: HeaderAction) -> Self {
        self.header.get_or_insert_with(NavHeader::default).actions.push(action);
        self
    }

    pub fn with_routes(mut self, routes: impl IntoIterator<Item = NavNode>) -> Self {
        self.children = Children::Static(route_map(routes));
        self
    }

    pub fn with_lazy(mut self, routes: impl LazyRoutes + 'static) -> Self {
        self.children = Children::Lazy(Arc::new(routes));
        self
    }

    pub fn leaf(mut self) -> Self {
        self.children = Children::Leaf;
        self
    }

    pub fn with_leaf(self, leaf: bool) -> Self {
        if leaf { self.leaf() } else { self }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Leaf)
    }
}

pub fn route_map(nodes: impl IntoIterator<Item = NavNode>) -> RouteMap {
    nodes.into_iter().map(|node| (node.id.clone(), node)).collect()
}
