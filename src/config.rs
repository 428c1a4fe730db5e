//! Configuration for TrackForge.
//!
//! Settings live in `.trackforge/trackforge.toml` under the project directory
//! and are layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [storage]
//! backend = "sqlite"          # or "local"
//! data_dir = "data"           # relative to the project directory
//! db_path = "data/trackforge.db"
//!
//! [sync]
//! on_failure = "refetch"      # or "revert", "keep"
//!
//! [session]
//! user_id = "alice"
//! guest = false
//!
//! [display]
//! density = "comfortable"
//! animations = true
//! ```
//!
//! | Variable               | Overrides             |
//! |------------------------|-----------------------|
//! | `TRACKFORGE_BACKEND`   | `storage.backend`     |
//! | `TRACKFORGE_DATA_DIR`  | `storage.data_dir`    |
//! | `TRACKFORGE_USER`      | `session.user_id`     |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trackforge_common::{Density, Settings};

use crate::session::Session;
use crate::workspace::ReconcilePolicy;

pub const CONFIG_DIR: &str = ".trackforge";
pub const CONFIG_FILE: &str = "trackforge.toml";

pub const ENV_BACKEND: &str = "TRACKFORGE_BACKEND";
pub const ENV_DATA_DIR: &str = "TRACKFORGE_DATA_DIR";
pub const ENV_USER: &str = "TRACKFORGE_USER";

/// Storage used for signed-in sessions. Guests always use local documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    #[default]
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "sqlite" => Ok(StorageBackend::Sqlite),
            _ => anyhow::bail!("Invalid storage backend '{}'. Valid values: local, sqlite", s),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for local documents and the default database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSection {
    /// What a workspace does when the backend rejects a change
    #[serde(default)]
    pub on_failure: ReconcilePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub guest: bool,
}

/// Settings used for a store that has never saved its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySection {
    #[serde(default)]
    pub density: Density,
    #[serde(default = "default_animations")]
    pub animations: bool,
}

fn default_animations() -> bool {
    true
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            density: Density::default(),
            animations: default_animations(),
        }
    }
}

/// The complete trackforge.toml configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackforgeToml {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub display: DisplaySection,
}

impl TrackforgeToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse trackforge.toml")
    }

    /// Load `trackforge.toml` from the config directory, or defaults when it
    /// doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize trackforge.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn display_settings(&self) -> Settings {
        Settings {
            density: self.display.density,
            animations: self.display.animations,
        }
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub verbose: bool,
    pub guest: bool,
    pub backend: Option<StorageBackend>,
    pub user: Option<String>,
}

/// Resolved configuration for one invocation.
///
/// It merges settings from:
/// 1. trackforge.toml file
/// 2. Environment variables
/// 3. CLI arguments
#[derive(Debug, Clone)]
pub struct TrackforgeConfig {
    pub project_dir: PathBuf,
    /// Path to the .trackforge directory
    pub config_dir: PathBuf,
    pub toml: TrackforgeToml,
    pub verbose: bool,
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub session: Session,
}

impl TrackforgeConfig {
    /// Resolve configuration for a project directory using the process
    /// environment.
    pub fn new(project_dir: PathBuf, cli: CliOverrides) -> Result<Self> {
        Self::resolve(project_dir, cli, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve(
        project_dir: PathBuf,
        cli: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = project_dir.join(CONFIG_DIR);
        let toml = TrackforgeToml::load_or_default(&config_dir)?;

        let backend = match (cli.backend, env(ENV_BACKEND)) {
            (Some(backend), _) => backend,
            (None, Some(value)) => value
                .parse()
                .with_context(|| format!("Invalid {}", ENV_BACKEND))?,
            (None, None) => toml.storage.backend,
        };

        let data_dir = env(ENV_DATA_DIR)
            .map(PathBuf::from)
            .or_else(|| toml.storage.data_dir.clone())
            .map(|dir| project_dir.join(dir))
            .unwrap_or_else(|| default_data_dir(&config_dir));

        let db_path = toml
            .storage
            .db_path
            .as_ref()
            .map(|path| project_dir.join(path))
            .unwrap_or_else(|| data_dir.join("trackforge.db"));

        let user = cli
            .user
            .or_else(|| env(ENV_USER))
            .or_else(|| toml.session.user_id.clone())
            .filter(|id| !id.trim().is_empty());
        let session = match user {
            Some(id) if !cli.guest && !toml.session.guest => Session::User { id },
            _ => Session::Guest,
        };

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            verbose: cli.verbose,
            backend,
            data_dir,
            db_path,
            session,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.toml.sync.on_failure
    }

    pub fn default_settings(&self) -> Settings {
        self.toml.display_settings()
    }

    /// Directory holding the guest session's documents.
    pub fn guest_dir(&self) -> PathBuf {
        self.data_dir.join("guest")
    }

    /// Directory holding a user's documents when the local backend is used.
    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.data_dir.join("users").join(user_id)
    }
}

/// `.trackforge/data` when the project has been initialized, otherwise the
/// platform data directory.
fn default_data_dir(config_dir: &Path) -> PathBuf {
    if config_dir.exists() {
        return config_dir.join("data");
    }
    dirs::data_dir()
        .map(|dir| dir.join("trackforge"))
        .unwrap_or_else(|| config_dir.join("data"))
}
