use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::future::BoxFuture;
use serde::Serialize;
use shared::{DownMsg, FolderContent, LabConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use w3lab_frontend::clients::{Clients, FolderClient};
use w3lab_frontend::connection::apply_down_msg;
use w3lab_frontend::{LabApp, Services};

#[derive(Parser)]
#[command(name = "w3lab-console")]
#[command(about = "Resolve W3Lab pages from recorded server snapshots")]
struct Cli {
    /// Lab configuration (TOML); defaults apply when absent
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// JSON array of server push messages applied before navigating
    #[arg(long, short)]
    messages: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Navigate to a path and print the rendered page
    Show {
        path: String,

        /// Print the table of contents instead of the page
        #[arg(long)]
        toc: bool,
    },
    /// Print the children of the node at a path
    List { path: String },
    /// Print the navigation path of a local project
    Project {
        name: String,

        #[arg(long)]
        version: Option<String>,
    },
}

#[derive(Serialize)]
struct ChildEntry {
    id: String,
    name: String,
    leaf: bool,
}

/// Folder listings read straight from the local disk.
struct LocalFolders;

impl FolderClient for LocalFolders {
    fn query_folder_content(&self, path: &str) -> BoxFuture<'static, anyhow::Result<FolderContent>> {
        let path = PathBuf::from(path);
        Box::pin(async move {
            let mut content = FolderContent::default();
            let mut entries = tokio::fs::read_dir(&path)
                .await
                .with_context(|| format!("reading `{}`", path.display()))?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().await?.is_dir() {
                    content.folders.push(name);
                } else {
                    content.files.push(name);
                }
            }
            content.folders.sort();
            content.files.sort();
            Ok(content)
        })
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<LabConfig> {
    let Some(path) = path else {
        return Ok(LabConfig::default());
    };
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config `{}`", path.display()))?;
    let config = LabConfig::from_toml(&source).with_context(|| format!("parsing config `{}`", path.display()))?;
    if config.app.needs_migration() {
        log::warn!(
            "config version {} is not current ({:?}), using defaults where needed",
            config.app.version,
            config.app.get_migration_strategy()
        );
    }
    Ok(config)
}

async fn load_messages(path: Option<&Path>) -> anyhow::Result<Vec<DownMsg>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading messages `{}`", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing messages `{}`", path.display()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).await?;
    let services = Services {
        clients: Clients {
            folders: Arc::new(LocalFolders),
            ..Clients::disconnected()
        },
        ..Services::default()
    };
    let app = LabApp::new(&config, services);

    let messages = load_messages(cli.messages.as_deref()).await?;
    log::info!("applying {} server message(s)", messages.len());
    for message in messages {
        apply_down_msg(message, &app.state).await;
    }

    let output = match cli.command {
        Commands::Show { path, toc: true } => {
            serde_json::to_string_pretty(&app.router.table_of_contents(path.as_str()).await)?
        }
        Commands::Show { path, toc: false } => {
            let page = app.router.navigate_to(path.as_str()).await?;
            serde_json::to_string_pretty(&page)?
        }
        Commands::List { path } => {
            let children = app.router.children_of(path.as_str()).await?;
            let entries: Vec<ChildEntry> = children
                .values()
                .map(|node| ChildEntry {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    leaf: node.is_leaf(),
                })
                .collect();
            serde_json::to_string_pretty(&entries)?
        }
        Commands::Project { name, version } => {
            serde_json::to_string_pretty(&app.project_nav(&name, version.as_deref()))?
        }
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
