use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== MESSAGE TYPES =====

/// Push messages received from the local server's WebSocket channels.
///
/// Every message carries a full snapshot of its domain; consumers replace their
/// previous state wholesale instead of patching it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum DownMsg {
    EnvironmentStatus(EnvironmentStatus),
    ProjectsStatus(ProjectsStatus),
    CdnStatus(CdnStatus),
    SessionDetails(SessionDetails),
    PluginsLoaded(Vec<PluginInfo>),
    PendingOperations(PendingOperations),
}

// ===== ENVIRONMENT =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentStatus {
    pub proxied_backends: Vec<ProxiedBackend>,
    pub proxied_esm_servers: Vec<ProxiedEsmServer>,
    pub projects: ProjectsSection,
    pub paths_book: PathsBook,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxiedBackend {
    pub name: String,
    pub version: String,
    pub uid: String,
    pub partition_id: String,
    /// Start time, seconds since epoch.
    #[serde(default)]
    pub started_at: u64,
    #[serde(default)]
    pub port: Option<u16>,
}

impl ProxiedBackend {
    pub fn display_name(&self) -> String {
        format!("{}#{}", self.name, self.version)
    }
}

/// Partition ids look like `name~hash`; only the name is displayed.
pub fn partition_display_name(partition_id: &str) -> &str {
    partition_id.split('~').next().unwrap_or(partition_id)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxiedEsmServer {
    pub package: String,
    pub version: String,
    pub uid: String,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectsSection {
    pub finders: Vec<ProjectsFinder>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsFinder {
    pub name: String,
    pub from_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PathsBook {
    pub config: String,
    pub databases: String,
    pub system: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PendingOperations {
    pub installing: Vec<String>,
    pub downloading: Vec<String>,
}

// ===== PROJECTS =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectsStatus {
    pub projects: Vec<Project>,
    pub failures: Vec<ProjectFailure>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    /// May contain `/` as namespace separator, e.g. `@youwol/foo`.
    pub name: String,
    pub version: String,
    pub path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFailure {
    pub path: String,
    pub message: String,
}

// ===== COMPONENTS =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CdnStatus {
    pub packages: Vec<CdnPackage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CdnPackage {
    pub id: String,
    pub name: String,
    /// Oldest version first.
    pub versions: Vec<CdnVersion>,
}

impl CdnPackage {
    pub fn latest_kind(&self) -> Option<WebpmKind> {
        self.versions.last().map(|version| version.kind)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CdnVersion {
    pub version: String,
    pub kind: WebpmKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WebpmKind {
    Webapp,
    Esm,
    Backend,
    Pyodide,
}

// ===== SESSION & EXPLORER =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionDetails {
    pub user_info: UserInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub name: String,
    pub groups: Vec<Group>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub path: String,
}

impl Group {
    pub fn is_private(&self) -> bool {
        self.id.contains("private")
    }

    pub fn short_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DefaultDrive {
    pub drive_id: String,
    pub group_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplorerChildren {
    pub folders: Vec<ExplorerFolder>,
    pub items: Vec<ExplorerItem>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerFolder {
    pub folder_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerItem {
    pub item_id: String,
    pub asset_id: String,
    pub name: String,
    pub kind: String,
}

// ===== LOGS =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RootLogs {
    pub logs: Vec<LogEntry>,
}

/// Root entry of the server's log tree; `context_id` keys its children.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub context_id: String,
    pub level: String,
    pub text: String,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
}

// ===== FILESYSTEM TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderContent {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MountedKind {
    File,
    Folder,
}

/// Host filesystem path exposed in the `/mounted` branch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MountedPath {
    pub path: String,
    pub kind: MountedKind,
}

impl MountedPath {
    pub fn folder(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: MountedKind::Folder }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: MountedKind::File }
    }

    /// Last path component, used as display name.
    pub fn base_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

// ===== PLUGINS =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    pub app: AppSection,
    pub router: RouterSection,
    pub bookmarks: BookmarksSection,
}

impl LabConfig {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

// AppSection carries the format version so that older files can be migrated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn needs_migration(&self) -> bool {
        self.version != Self::CURRENT_VERSION
    }

    pub fn get_migration_strategy(&self) -> MigrationStrategy {
        match self.version.as_str() {
            "1.0.0" => MigrationStrategy::None,
            _ => MigrationStrategy::Recreate,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStrategy {
    None,
    Recreate,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompanionMode {
    /// At most one companion pane.
    #[default]
    Single,
    /// Ordered list of companion panes.
    Multiple,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RouterSection {
    /// Symbolic alias -> concrete path, used by `@nav[alias]/rest` links.
    pub aliases: BTreeMap<String, String>,
    pub mount_confirmation_timeout_ms: u64,
    pub companion_mode: CompanionMode,
}

impl Default for RouterSection {
    fn default() -> Self {
        let aliases = [
            ("w3nest-api", "@nav/doc/server-api/w3nest"),
            ("w3nest-client-api", "@nav/doc/server-api/w3nest-client"),
            ("w3nest-install", "@nav/doc/how-to/install"),
            ("w3nest-start", "@nav/doc/how-to/start"),
            ("w3nest-publish", "@nav/doc/how-to/publish"),
            ("w3nest-ci", "@nav/doc/how-to/ci"),
        ]
        .into_iter()
        .map(|(alias, path)| (alias.to_string(), path.to_string()))
        .collect();
        Self {
            aliases,
            mount_confirmation_timeout_ms: 5_000,
            companion_mode: CompanionMode::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BookmarksSection {
    pub defaults: Vec<String>,
}

impl Default for BookmarksSection {
    fn default() -> Self {
        let defaults = [
            "/environment",
            "/webpm",
            "/projects",
            "/explorer",
            "/mounted",
            "/plugins",
            "/doc",
        ];
        Self {
            defaults: defaults.iter().map(|path| path.to_string()).collect(),
        }
    }
}
