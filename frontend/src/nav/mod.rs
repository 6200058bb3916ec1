//! Navigation core: targets, tree nodes, lazy branches and the router.

mod companion;
mod error;
mod history;
mod lazy;
mod node;
mod router;
mod storage;
mod target;

pub use companion::{Bookmarks, Companion, companion_action};
pub use error::NavError;
pub use history::{AddressBar, MemoryHistory};
pub use lazy::{LazyBranch, LazyRoutes, Resolution};
pub use node::{Children, Content, HeaderAction, Layout, NavHeader, NavNode, RouteMap, route_map};
pub use router::{
    Crumb, Page, PageStatus, Pane, Redirect, Router, RouterContext, RouterOptions, redirect,
};
pub use storage::{KeyValueStore, MemoryStore, load_json, save_json};
pub use target::{NavTarget, expand_link};
