//! Hierarchical router over a partially lazy navigation tree.
//!
//! The tree is walked segment by segment. Static children are looked up
//! directly; lazy branches are asked for the children of the node found at the
//! residual path below their mount point. Rendering is latest-wins: a page
//! computed for a target that is no longer current never reaches subscribers.

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, BoxStream, StreamExt};
use futures_signals::map_ref;
use futures_signals::signal::{self, Mutable, Signal, SignalExt};
use serde::Serialize;
use shared::RouterSection;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use super::{
    AddressBar, Children, LazyRoutes, Layout, MemoryHistory, NavError, NavHeader, NavNode,
    NavTarget, Resolution, RouteMap, expand_link,
};
use crate::view::{NoteLevel, View};

/// Async rewrite of a target before it is walked.
pub type Redirect =
    Arc<dyn Fn(NavTarget) -> BoxFuture<'static, anyhow::Result<NavTarget>> + Send + Sync>;

pub fn redirect<F, Fut>(handler: F) -> Redirect
where
    F: Fn(NavTarget) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<NavTarget>> + Send + 'static,
{
    Arc::new(move |target| handler(target).boxed())
}

pub struct RouterOptions {
    pub aliases: BTreeMap<String, String>,
    pub redirects: Vec<Redirect>,
    pub address_bar: Arc<dyn AddressBar>,
    pub mount_confirmation_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            redirects: Vec::new(),
            address_bar: Arc::new(MemoryHistory::default()),
            mount_confirmation_timeout: Duration::from_millis(5000),
        }
    }
}

impl RouterOptions {
    pub fn from_config(section: &RouterSection) -> Self {
        Self {
            aliases: section.aliases.clone(),
            mount_confirmation_timeout: Duration::from_millis(section.mount_confirmation_timeout_ms),
            ..Self::default()
        }
    }

    pub fn with_redirect(mut self, redirect: Redirect) -> Self {
        self.redirects.push(redirect);
        self
    }

    pub fn with_address_bar(mut self, address_bar: Arc<dyn AddressBar>) -> Self {
        self.address_bar = address_bar;
        self
    }
}

/// What layouts and resolvers see of the navigation in progress.
#[derive(Clone)]
pub struct RouterContext {
    pub router: Router,
    pub target: NavTarget,
}

impl RouterContext {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.target.parameter(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Found,
    /// No node at the target; a neutral placeholder is shown.
    NotFound,
    /// The node vanished from its branch while open; the last resolved node
    /// renders again against the latest data.
    Retained,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crumb {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub target: NavTarget,
    pub status: PageStatus,
    pub name: String,
    pub header: Option<NavHeader>,
    pub crumbs: Vec<Crumb>,
    pub content: View,
}

struct Retained {
    path: String,
    node: NavNode,
    crumbs: Vec<Crumb>,
}

/// Current target of one view pane, plus the node it last resolved.
pub(crate) struct PaneState {
    target: Mutable<NavTarget>,
    retained: Mutex<Option<Retained>>,
}

impl PaneState {
    fn new(target: NavTarget) -> Self {
        Self {
            target: Mutable::new(target),
            retained: Mutex::new(None),
        }
    }

    fn retain(&self, target: &NavTarget, node: &NavNode, crumbs: &[Crumb]) {
        // A stale render must not replace what the current target resolved.
        if self.target.lock_ref().path != target.path {
            return;
        }
        *self.retained.lock().unwrap_or_else(PoisonError::into_inner) = Some(Retained {
            path: target.path.clone(),
            node: node.clone(),
            crumbs: crumbs.to_vec(),
        });
    }

    /// Drop the retained node once the pane shows another path.
    fn release_unless(&self, target: &NavTarget) {
        if self.target.lock_ref().path != target.path {
            return;
        }
        let mut retained = self.retained.lock().unwrap_or_else(PoisonError::into_inner);
        if retained.as_ref().is_some_and(|retained| retained.path != target.path) {
            *retained = None;
        }
    }

    fn retained_for(&self, path: &str) -> Option<(NavNode, Vec<Crumb>)> {
        let retained = self.retained.lock().unwrap_or_else(PoisonError::into_inner);
        retained
            .as_ref()
            .filter(|retained| retained.path == path)
            .map(|retained| (retained.node.clone(), retained.crumbs.clone()))
    }
}

struct Cursor {
    node: NavNode,
    /// Innermost lazy branch and the depth it is mounted at.
    branch: Option<(Arc<dyn LazyRoutes>, usize)>,
    crumbs: Vec<Crumb>,
}

impl Cursor {
    fn root(node: NavNode) -> Self {
        Self {
            node,
            branch: None,
            crumbs: Vec::new(),
        }
    }

    /// Children of the current node, found at `segments[..depth]`.
    fn expand(&mut self, segments: &[String], depth: usize, ctx: &RouterContext) -> Resolution {
        match &self.node.children {
            Children::Static(routes) => {
                self.branch = None;
                Resolution::Ready(Some(routes.clone()))
            }
            Children::Lazy(routes) => {
                let routes = routes.clone();
                let resolution = routes.resolve(&[], ctx);
                self.branch = Some((routes, depth));
                resolution
            }
            Children::Inherit => match &self.branch {
                Some((routes, mount)) => routes.resolve(&segments[*mount..depth], ctx),
                None => Resolution::none(),
            },
            Children::Leaf => Resolution::none(),
        }
    }

    fn descend(&mut self, child: NavNode, segments: &[String], depth: usize) {
        self.crumbs.push(Crumb {
            path: format!("/{}", segments[..=depth].join("/")),
            name: child.name.clone(),
        });
        self.node = child;
    }
}

enum Walk {
    Found(Cursor),
    NotFound,
    Failed(anyhow::Error),
}

struct RouterInner {
    tree: OnceLock<NavNode>,
    bootstrap: Option<Shared<BoxFuture<'static, NavNode>>>,
    aliases: BTreeMap<String, String>,
    redirects: Vec<Redirect>,
    address_bar: Arc<dyn AddressBar>,
    mount_confirmation_timeout: Duration,
    primary: Arc<PaneState>,
    generation: AtomicU64,
}

#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn new(tree: NavNode, options: RouterOptions) -> Self {
        let router = Self::with_parts(None, options);
        let _ = router.inner.tree.set(tree);
        router
    }

    /// Router whose tree is produced by an async bootstrap (e.g. waiting for
    /// the first environment snapshot). Navigation waits for it.
    pub fn bootstrap<F>(tree: F, options: RouterOptions) -> Self
    where
        F: Future<Output = NavNode> + Send + 'static,
    {
        Self::with_parts(Some(tree.boxed().shared()), options)
    }

    fn with_parts(
        bootstrap: Option<Shared<BoxFuture<'static, NavNode>>>,
        options: RouterOptions,
    ) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                tree: OnceLock::new(),
                bootstrap,
                aliases: options.aliases,
                redirects: options.redirects,
                address_bar: options.address_bar,
                mount_confirmation_timeout: options.mount_confirmation_timeout,
                primary: Arc::new(PaneState::new(NavTarget::new("/"))),
                generation: AtomicU64::new(0),
            }),
        }
    }

    async fn tree(&self) -> NavNode {
        if let Some(tree) = self.inner.tree.get() {
            return tree.clone();
        }
        match &self.inner.bootstrap {
            Some(bootstrap) => {
                let tree = bootstrap.clone().await;
                self.inner.tree.get_or_init(|| tree).clone()
            }
            None => NavNode::new("", "", Layout::fixed(View::column(Vec::new()))).leaf(),
        }
    }

    fn context(&self, target: NavTarget) -> RouterContext {
        RouterContext {
            router: self.clone(),
            target,
        }
    }

    pub fn current_target(&self) -> NavTarget {
        self.inner.primary.target.get_cloned()
    }

    pub fn target_signal(&self) -> impl Signal<Item = NavTarget> + Send + use<> {
        self.inner.primary.target.signal_cloned()
    }

    /// Navigate the primary pane. Resolves with the rendered page, or with
    /// `Superseded` if another navigation started meanwhile.
    pub async fn navigate_to(&self, target: impl Into<NavTarget>) -> Result<Page, NavError> {
        let target = self.prepare(target.into()).await;
        self.go(target, false).await
    }

    /// Like `navigate_to`, also recording the URL in the address bar history.
    pub async fn fire_navigate_to(&self, target: impl Into<NavTarget>) -> Result<Page, NavError> {
        let target = self.prepare(target.into()).await;
        self.go(target, true).await
    }

    async fn go(&self, target: NavTarget, push_address: bool) -> Result<Page, NavError> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("navigating to `{}`", target.to_url());
        if push_address {
            self.inner.address_bar.push(&target.to_url());
        }
        self.inner.primary.target.set(target.clone());
        let page = self.render_in(&self.inner.primary, target).await;
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            return Err(NavError::Superseded {
                path: page.target.path,
            });
        }
        Ok(page)
    }

    /// Re-render the primary pane's current target against the latest data.
    pub async fn refresh(&self) -> Page {
        let target = self.current_target();
        self.render_in(&self.inner.primary, target).await
    }

    /// Render `target` without moving any pane to it.
    pub async fn render(&self, target: impl Into<NavTarget>) -> Page {
        let target = self.expand(target.into());
        let detached = PaneState::new(target.clone());
        self.render_in(&detached, target).await
    }

    async fn prepare(&self, target: NavTarget) -> NavTarget {
        let redirected = self.apply_redirects(target).await;
        self.expand(redirected)
    }

    async fn apply_redirects(&self, original: NavTarget) -> NavTarget {
        let mut current = original.clone();
        for redirect in &self.inner.redirects {
            match redirect(current).await {
                Ok(next) => current = next,
                Err(err) => {
                    log::warn!(
                        "redirect of `{}` failed, keeping the original target: {err:#}",
                        original.path
                    );
                    return original;
                }
            }
        }
        current
    }

    fn expand(&self, target: NavTarget) -> NavTarget {
        match expand_link(&target.path, &self.inner.aliases) {
            Ok(path) => NavTarget {
                path: NavTarget::new(&path).path,
                ..target
            },
            Err(err) => {
                log::warn!("{err}");
                target
            }
        }
    }

    async fn walk(&self, segments: &[String], ctx: &RouterContext) -> Walk {
        let mut cursor = Cursor::root(self.tree().await);
        for (depth, segment) in segments.iter().enumerate() {
            let children = match cursor.expand(segments, depth, ctx) {
                Resolution::Ready(children) => children,
                Resolution::Pending(pending) => match pending.await {
                    Ok(children) => children,
                    Err(err) => return Walk::Failed(err),
                },
            };
            match children.and_then(|mut routes| routes.shift_remove(segment)) {
                Some(child) => cursor.descend(child, segments, depth),
                None => return Walk::NotFound,
            }
        }
        Walk::Found(cursor)
    }

    async fn render_in(&self, pane: &PaneState, target: NavTarget) -> Page {
        let ctx = self.context(target.clone());
        pane.release_unless(&target);
        match self.walk(&target.segments(), &ctx).await {
            Walk::Found(cursor) => {
                pane.retain(&target, &cursor.node, &cursor.crumbs);
                page_for(ctx, PageStatus::Found, &cursor.node, cursor.crumbs).await
            }
            Walk::NotFound => match pane.retained_for(&target.path) {
                Some((node, crumbs)) => {
                    log::info!("`{}` is gone from its branch, keeping the open page", target.path);
                    page_for(ctx, PageStatus::Retained, &node, crumbs).await
                }
                None => {
                    log::debug!("no node at `{}`", target.path);
                    not_found_page(target)
                }
            },
            Walk::Failed(err) => {
                log::error!("resolving `{}` failed: {err:#}", target.path);
                failed_page(target, &err)
            }
        }
    }

    /// Synchronous lookup against already available data.
    ///
    /// Returns `None` for unknown paths, before bootstrap completes, and when a
    /// branch on the way needs an async fetch.
    pub fn get_node(&self, path: &str) -> Option<NavNode> {
        let target = self.expand(NavTarget::parse(path));
        let tree = self.inner.tree.get()?.clone();
        let ctx = self.context(target.clone());
        let segments = target.segments();
        let mut cursor = Cursor::root(tree);
        for (depth, segment) in segments.iter().enumerate() {
            let Resolution::Ready(children) = cursor.expand(&segments, depth, &ctx) else {
                return None;
            };
            let child = children?.shift_remove(segment)?;
            cursor.descend(child, &segments, depth);
        }
        Some(cursor.node)
    }

    /// Children of the node at `target`, in display order.
    pub async fn children_of(&self, target: impl Into<NavTarget>) -> Result<RouteMap, NavError> {
        let target = self.expand(target.into());
        let ctx = self.context(target.clone());
        let segments = target.segments();
        let mut cursor = match self.walk(&segments, &ctx).await {
            Walk::Found(cursor) => cursor,
            Walk::NotFound => return Err(NavError::NotFound { path: target.path }),
            Walk::Failed(err) => return Err(resolution_error(&target, &err)),
        };
        let children = match cursor.expand(&segments, segments.len(), &ctx) {
            Resolution::Ready(children) => children,
            Resolution::Pending(pending) => pending
                .await
                .map_err(|err| resolution_error(&target, &err))?,
        };
        Ok(children.unwrap_or_default())
    }

    /// Table of contents of the node at `target`, if its layout has one.
    /// The page content is not computed.
    pub async fn table_of_contents(&self, target: impl Into<NavTarget>) -> Option<View> {
        let target = self.expand(target.into());
        let ctx = self.context(target.clone());
        let Walk::Found(cursor) = self.walk(&target.segments(), &ctx).await else {
            return None;
        };
        match cursor.node.layout.table_of_contents(&ctx)?.into_view().await {
            Ok(view) => Some(view),
            Err(err) => {
                log::warn!("table of contents of `{}` failed: {err:#}", target.path);
                None
            }
        }
    }

    /// Page of the primary pane, re-rendered on every target change and every
    /// emission of a lazy branch. Renders still running when a newer trigger
    /// arrives are dropped.
    pub fn page_signal(&self) -> impl Signal<Item = Option<Page>> + Send + use<> {
        self.pane_signal(self.inner.primary.clone())
    }

    fn pane_signal(&self, pane: Arc<PaneState>) -> impl Signal<Item = Option<Page>> + Send + use<> {
        let router = self.clone();
        let changes = signal::from_stream(self.tree_changes());
        let trigger = map_ref! {
            let target = pane.target.signal_cloned(),
            let _change = changes => target.clone()
        };
        trigger.map_future(move |target| {
            let router = router.clone();
            let pane = pane.clone();
            async move { router.render_in(&pane, target).await }
        })
    }

    /// One `()` per emission of any lazy branch reachable through static routes.
    fn tree_changes(&self) -> BoxStream<'static, ()> {
        let router = self.clone();
        stream::once(async move { router.tree().await })
            .flat_map(|tree| {
                let mut branches = Vec::new();
                collect_lazy(&tree, &mut branches);
                stream::select_all(branches.into_iter().map(|branch| branch.changes()))
            })
            .boxed()
    }

    /// Wait until `path` resolves, e.g. right after asking the server to mount
    /// a folder, then navigate there.
    pub async fn navigate_when_available(&self, path: &str) -> Result<Page, NavError> {
        let target = self.prepare(NavTarget::parse(path)).await;
        let url = target.to_url();
        let timeout = self.inner.mount_confirmation_timeout;
        let router = self.clone();
        let available = async move {
            let mut changes = router.tree_changes();
            while router.get_node(&url).is_none() {
                if changes.next().await.is_none() {
                    return false;
                }
            }
            true
        };
        match tokio::time::timeout(timeout, available).await {
            Ok(true) => self.go(target, true).await,
            Ok(false) => Err(NavError::NotFound { path: target.path }),
            Err(_) => {
                log::warn!("`{}` not available after {} ms", target.path, timeout.as_millis());
                Err(NavError::Timeout {
                    path: target.path,
                    waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// Secondary view pane navigating independently of the primary one.
    pub fn pane(&self, target: impl Into<NavTarget>) -> Pane {
        Pane {
            router: self.clone(),
            state: Arc::new(PaneState::new(self.expand(target.into()))),
        }
    }
}

#[derive(Clone)]
pub struct Pane {
    router: Router,
    state: Arc<PaneState>,
}

impl Pane {
    pub fn target(&self) -> NavTarget {
        self.state.target.get_cloned()
    }

    pub async fn navigate_to(&self, target: impl Into<NavTarget>) -> Page {
        let target = self.router.prepare(target.into()).await;
        self.state.target.set(target.clone());
        self.router.render_in(&self.state, target).await
    }

    pub async fn render(&self) -> Page {
        let target = self.target();
        self.router.render_in(&self.state, target).await
    }

    pub fn page_signal(&self) -> impl Signal<Item = Option<Page>> + Send + use<> {
        self.router.pane_signal(self.state.clone())
    }
}

fn collect_lazy(node: &NavNode, branches: &mut Vec<Arc<dyn LazyRoutes>>) {
    match &node.children {
        Children::Static(routes) => routes
            .values()
            .for_each(|child| collect_lazy(child, branches)),
        Children::Lazy(routes) => branches.push(routes.clone()),
        Children::Inherit | Children::Leaf => {}
    }
}

async fn page_for(ctx: RouterContext, status: PageStatus, node: &NavNode, crumbs: Vec<Crumb>) -> Page {
    let (status, content) = match node.layout.content(&ctx).into_view().await {
        Ok(view) => (status, view),
        Err(err) => {
            log::error!("content of `{}` failed: {err:#}", ctx.target.path);
            (PageStatus::Failed, error_view(&err))
        }
    };
    Page {
        target: ctx.target,
        status,
        name: node.name.clone(),
        header: node.header.clone(),
        crumbs,
        content,
    }
}

fn not_found_page(target: NavTarget) -> Page {
    let content = View::column(vec![
        View::title("Not found", "fas fa-question"),
        View::note(
            NoteLevel::Info,
            format!("There is nothing at `{}`.", target.path),
        ),
    ]);
    Page {
        target,
        status: PageStatus::NotFound,
        name: "Not found".to_string(),
        header: None,
        crumbs: Vec::new(),
        content,
    }
}

fn failed_page(target: NavTarget, err: &anyhow::Error) -> Page {
    Page {
        target,
        status: PageStatus::Failed,
        name: "Error".to_string(),
        header: None,
        crumbs: Vec::new(),
        content: error_view(err),
    }
}

fn error_view(err: &anyhow::Error) -> View {
    View::note(NoteLevel::Error, format!("{err:#}"))
}

fn resolution_error(target: &NavTarget, err: &anyhow::Error) -> NavError {
    NavError::Resolution {
        path: target.path.clone(),
        message: format!("{err:#}"),
    }
}
