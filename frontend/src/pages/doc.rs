//! `/doc`: static documentation pages, targets of the `@nav[...]` aliases.

use crate::dataflow::Actor;
use crate::nav::{LazyBranch, Layout, NavNode, Resolution, RouterContext};
use crate::view::{NoteLevel, View};

fn markdown_page(id: &str, name: &str, source: &'static str) -> NavNode {
    NavNode::new(id, name, Layout::fixed(View::markdown(source)))
        .with_icon("fas fa-book")
        .leaf()
}

/// Page whose table of contents lists its `## ` headings.
fn chapter(id: &str, name: &str, source: &'static str) -> NavNode {
    let layout = Layout::fixed(View::markdown(source)).with_toc(move |_ctx: &RouterContext| {
        View::list(
            source
                .lines()
                .filter_map(|line| line.strip_prefix("## "))
                .map(View::text)
                .collect(),
        )
    });
    NavNode::new(id, name, layout).with_icon("fas fa-book-open")
}

/// Module of a documented Python package; `path` uses `/` between packages
/// and `.` inside the last one, as in `app/config.projects`.
#[derive(Debug)]
struct ApiModule {
    path: &'static str,
    summary: &'static str,
    symbols: &'static [&'static str],
}

/// Module pages below an API chapter, plus one page per documented symbol
/// addressed as `<module>.<Symbol>`.
fn api_modules(modules: &'static [ApiModule]) -> LazyBranch<&'static [ApiModule]> {
    LazyBranch::new(
        Actor::constant(modules),
        |modules: &&'static [ApiModule], residual: &[String], _ctx: &RouterContext| {
            let modules: &'static [ApiModule] = *modules;
            let parent = residual.join("/");
            if !parent.is_empty() && !modules.iter().any(|module| module.path == parent) {
                return Resolution::none();
            }
            let nested = modules.iter().filter(|module| match module.path.rsplit_once('/') {
                Some((module_parent, _)) => module_parent == parent,
                None => parent.is_empty(),
            });
            Resolution::children(nested.flat_map(|module| {
                let segment = module.path.rsplit('/').next().unwrap_or(module.path);
                let page = NavNode::new(segment, segment, Layout::fixed(module_view(module, None)))
                    .with_icon("fas fa-cube");
                let symbols = module.symbols.iter().map(move |symbol| {
                    NavNode::new(
                        format!("{segment}.{symbol}"),
                        *symbol,
                        Layout::fixed(module_view(module, Some(*symbol))),
                    )
                    .with_icon("fas fa-code")
                    .leaf()
                });
                std::iter::once(page).chain(symbols)
            }))
        },
    )
}

fn module_view(module: &ApiModule, symbol: Option<&str>) -> View {
    let mut children = vec![
        View::title(module.path.replace('/', "."), "fas fa-cube"),
        View::markdown(module.summary),
    ];
    if let Some(symbol) = symbol {
        children.push(View::note(NoteLevel::Info, format!("Symbol `{symbol}`")));
    }
    if !module.symbols.is_empty() {
        children.push(View::section(
            "Symbols",
            module.symbols.iter().map(|symbol| View::text(*symbol)).collect(),
        ));
    }
    View::column(children)
}

pub fn navigation() -> NavNode {
    NavNode::new(
        "doc",
        "Doc",
        Layout::fixed(View::column(vec![
            View::title("Documentation", "fas fa-book"),
            View::list(vec![
                View::link("Server API", "/doc/server-api"),
                View::link("How-to", "/doc/how-to"),
                View::link("API", "/doc/api"),
            ]),
        ])),
    )
    .with_icon("fas fa-book")
    .with_routes([
        NavNode::new("server-api", "Server API", Layout::fixed(View::title("Server API", "fas fa-server")))
            .with_routes([
                chapter("w3nest", "w3nest", W3NEST_API).with_lazy(api_modules(W3NEST_MODULES)),
                chapter("w3nest-client", "w3nest-client", W3NEST_CLIENT_API).leaf(),
            ]),
        NavNode::new("how-to", "How-to", Layout::fixed(View::title("How-to", "fas fa-question-circle")))
            .with_routes([
                markdown_page("install", "Install", INSTALL),
                markdown_page("start", "Start", START),
                markdown_page("publish", "Publish", PUBLISH),
                markdown_page("ci", "CI", CI),
                markdown_page("custom-home", "Custom home", CUSTOM_HOME),
            ]),
        NavNode::new("api", "API", Layout::fixed(View::title("API", "fas fa-code")))
            .with_routes([
                markdown_page("youwol", "youwol", YOUWOL_API),
                markdown_page("yw_utils", "yw_utils", YW_UTILS_API),
            ]),
    ])
}

const W3NEST_API: &str = "# w3nest\n\nHTTP API of the local server.\n\n\
## Environment\n\nStatus of the running backends and ESM servers.\n\n\
## Projects\n\nProjects found below the configured finders.\n\n\
## Components\n\nInstalled packages and their versions.\n";

const W3NEST_MODULES: &[ApiModule] = &[
    ApiModule {
        path: "app",
        summary: "Entry point of the local server.",
        symbols: &[],
    },
    ApiModule {
        path: "app/config.configuration",
        summary: "Root of the configuration file.",
        symbols: &["Configuration"],
    },
    ApiModule {
        path: "app/config.projects",
        summary: "Where projects are looked up, and the templates creating them.",
        symbols: &["Projects", "ProjectsFinder", "ProjectTemplate"],
    },
    ApiModule {
        path: "app/config.system",
        summary: "Paths, ports and browser cache of the server.",
        symbols: &["System", "LocalEnvironment", "BrowserEnvironment"],
    },
    ApiModule {
        path: "app/config.cloud",
        summary: "Remote environments the server connects to.",
        symbols: &["CloudEnvironment"],
    },
    ApiModule {
        path: "app/config.customization",
        summary: "Commands, middlewares and events plugged by the user.",
        symbols: &["Customization"],
    },
    ApiModule {
        path: "app/middlewares",
        summary: "Middlewares processing every request.",
        symbols: &[],
    },
];

const W3NEST_CLIENT_API: &str = "# w3nest-client\n\nPython client of the local server.\n\n\
## Connection\n\nReaching the server from a script.\n\n\
## Requests\n\nTyped wrappers of the HTTP API.\n";

const INSTALL: &str = "# Install\n\nInstall the local server with `pipx install w3nest`.";

const START: &str = "# Start\n\nRun `w3nest` from the folder holding your configuration.";

const PUBLISH: &str = "# Publish\n\nPublish a project to the local components database from its page under `/projects`.";

const CI: &str = "# CI\n\nDeclare the pipeline steps of a project in its `.w3nest` folder.";

const CUSTOM_HOME: &str = "# Custom home\n\nProvide a home page extension to replace the default home page.";

const YOUWOL_API: &str = "# youwol\n\nLegacy API of the local server, superseded by `w3nest`.";

const YW_UTILS_API: &str = "# yw_utils\n\nLegacy utilities, superseded by `w3nest-client`.";
