//! Lazy route resolvers bound to replay-latest data sources.

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::future::Future;
use std::sync::Arc;

use super::{NavNode, RouteMap, RouterContext, route_map};
use crate::dataflow::Actor;

/// Children listing of the node found at a residual path.
pub enum Resolution {
    /// `None` means the residual path has no children (leaf or unknown).
    Ready(Option<RouteMap>),
    Pending(BoxFuture<'static, anyhow::Result<Option<RouteMap>>>),
}

impl Resolution {
    pub fn children(nodes: impl IntoIterator<Item = NavNode>) -> Self {
        Resolution::Ready(Some(route_map(nodes)))
    }

    pub fn none() -> Self {
        Resolution::Ready(None)
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Option<RouteMap>>> + Send + 'static,
    {
        Resolution::Pending(Box::pin(future))
    }
}

/// A branch of the tree whose structure is computed from live data.
///
/// `resolve` receives the segments between the branch mount point and the node
/// whose children are requested, and must be total: unknown paths return
/// `Resolution::none()`. `changes` emits once per source emission so that the
/// open page gets re-resolved against the latest snapshot.
pub trait LazyRoutes: Send + Sync {
    fn resolve(&self, residual: &[String], ctx: &RouterContext) -> Resolution;

    fn changes(&self) -> BoxStream<'static, ()>;
}

type ResolverFn<T> = dyn Fn(&T, &[String], &RouterContext) -> Resolution + Send + Sync;

/// Lazy branch reading the latest value of an Actor on every resolution.
pub struct LazyBranch<T>
where
    T: Clone + Send + Sync + 'static,
{
    source: Actor<T>,
    resolver: Arc<ResolverFn<T>>,
}

impl<T> LazyBranch<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F>(source: Actor<T>, resolver: F) -> Self
    where
        F: Fn(&T, &[String], &RouterContext) -> Resolution + Send + Sync + 'static,
    {
        Self {
            source,
            resolver: Arc::new(resolver),
        }
    }
}

impl<T> LazyRoutes for LazyBranch<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn resolve(&self, residual: &[String], ctx: &RouterContext) -> Resolution {
        let snapshot = self.source.latest();
        (self.resolver)(&snapshot, residual, ctx)
    }

    fn changes(&self) -> BoxStream<'static, ()> {
        self.source.changes()
    }
}
