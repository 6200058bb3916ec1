//! Branches of the lab navigation tree.

pub mod badges;
pub mod doc;
pub mod environment;
pub mod explorer;
pub mod mounted;
pub mod plugins;
pub mod projects;
pub mod webpm;

use crate::clients::Clients;
use crate::extension::Extensions;
use crate::nav::{Content, Layout, NavNode, NavTarget, Redirect, RouterContext, redirect};
use crate::state::AppState;
use crate::view::{NoteLevel, View};

/// What page layouts and resolvers close over.
#[derive(Clone)]
pub struct PageDeps {
    pub state: AppState,
    pub clients: Clients,
    pub extensions: Extensions,
}

pub fn lab_tree(deps: &PageDeps) -> NavNode {
    NavNode::new("", "W3Lab", home_layout(deps))
        .with_icon("fas fa-flask")
        .with_routes([
            environment::navigation(deps),
            webpm::navigation(deps),
            projects::navigation(deps),
            explorer::navigation(deps),
            mounted::navigation(deps),
            plugins::navigation(deps),
            doc::navigation(),
        ])
}

fn home_layout(deps: &PageDeps) -> Layout {
    let home = deps.extensions.home.clone();
    let state = deps.state.clone();
    Layout::new(move |ctx: &RouterContext| match &home {
        Some(custom) => Content::Pending(custom.render(ctx)),
        None => Content::Ready(default_home(&state)),
    })
}

fn default_home(state: &AppState) -> View {
    let badges = badges::nav_badges(&state.environment.latest(), &state.pending_operations.latest());
    View::column(vec![
        View::title("W3Lab", "fas fa-flask"),
        View::markdown(
            "Welcome to the lab of your local W3Nest server. \
             Define a custom home page to replace this one.",
        ),
        badges::badges_view(&badges),
        View::list(vec![
            View::link("Environment", "/environment"),
            View::link("WebPM", "/webpm"),
            View::link("Projects", "/projects"),
            View::link("Documentation", "/doc"),
        ]),
    ])
}

/// Old API documentation paths moved below `/doc`.
pub fn legacy_redirect() -> Redirect {
    redirect(|target: NavTarget| async move {
        let moved = ["/api/youwol", "/api/yw_utils"]
            .iter()
            .find(|prefix| target.path.starts_with(*prefix))
            .map(|_| format!("/doc{}", target.path));
        Ok::<_, anyhow::Error>(match moved {
            Some(path) => NavTarget { path, ..target },
            None => target,
        })
    })
}

/// Page shown for an entity gone from the latest snapshot.
pub(crate) fn gone_view(title: &str, icon: &str, notice: String) -> View {
    View::column(vec![View::title(title, icon), View::note(NoteLevel::Warning, notice)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn legacy_paths_move_below_doc() {
        let legacy = legacy_redirect();
        let moved = legacy(NavTarget::parse("/api/youwol/app?x=1")).await.unwrap();
        assert_eq!(moved.path, "/doc/api/youwol/app");
        assert_eq!(moved.parameter("x"), Some("1"));

        let kept = legacy(NavTarget::new("/projects")).await.unwrap();
        assert_eq!(kept.path, "/projects");
    }
}
