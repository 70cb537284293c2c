//! Configuration file support for fwkit.
//!
//! fwkit reads two configuration file locations:
//! - Global: `~/.fwkit/config.toml` - User-wide defaults
//! - Project: `<root>/fwkit.toml` - Firmware-root overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Manifest listing the available revisions, one per line.
pub const DEFAULT_VERSION_URL: &str =
    "http://yus-repo.googlecode.com/svn/trunk/stm32/stm32-ide/hardware/cores/bsp/version";

/// Base URL of the historical snapshots; the revision tag is appended.
pub const DEFAULT_HISTORY_URL: &str = "http://yus-repo.googlecode.com/svn-history/";

/// Remote path of the core tree below a snapshot.
pub const DEFAULT_CORE_PATH: &str = "/trunk/stm32/stm32-ide/hardware/cores/";

/// Remote path of the user library collection below a snapshot.
pub const DEFAULT_LIBRARIES_PATH: &str = "/trunk/stm32/stm32-ide/libraries/";

/// Remote path of the example projects below a snapshot.
pub const DEFAULT_EXAMPLES_PATH: &str = "/trunk/stm32/stm32-ide/examples/";

/// File name of the project configuration inside the firmware root.
pub const PROJECT_CONFIG_FILE: &str = "fwkit.toml";

/// fwkit configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library synchronization settings
    pub sync: SyncConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Compiler defines passed as `-DNAME=VALUE`
    pub defines: BTreeMap<String, String>,
}

/// Library synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// URL of the revision manifest
    pub version_url: String,

    /// Base URL of revision snapshots
    pub history_url: String,

    /// Remote path of the core tree
    pub core_path: String,

    /// Remote path of the library collection
    pub libraries_path: String,

    /// Remote path of the example projects
    pub examples_path: String,

    /// Connect timeout in seconds
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds
    pub timeout: u64,

    /// Parallel downloads per tree (1 = sequential)
    pub jobs: usize,

    /// Maximum folder depth followed while listing a tree
    pub max_depth: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            version_url: DEFAULT_VERSION_URL.to_string(),
            history_url: DEFAULT_HISTORY_URL.to_string(),
            core_path: DEFAULT_CORE_PATH.to_string(),
            libraries_path: DEFAULT_LIBRARIES_PATH.to_string(),
            examples_path: DEFAULT_EXAMPLES_PATH.to_string(),
            connect_timeout: 10,
            timeout: 60,
            jobs: 1,
            max_depth: 16,
        }
    }
}

impl SyncConfig {
    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory for generated artifacts (None = `<file dir>/build`)
    pub out_dir: Option<PathBuf>,

    /// Extension of example project files (None = "phr")
    pub project_extension: Option<String>,
}

impl BuildConfig {
    /// Extension of example project files.
    pub fn project_extension(&self) -> &str {
        self.project_extension.as_deref().unwrap_or("phr")
    }
}

/// Raw project/global file contents; every field optional so that merging
/// only overrides what a file actually sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PartialConfig {
    sync: PartialSyncConfig,
    build: BuildConfig,
    defines: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PartialSyncConfig {
    version_url: Option<String>,
    history_url: Option<String>,
    core_path: Option<String>,
    libraries_path: Option<String>,
    examples_path: Option<String>,
    connect_timeout: Option<u64>,
    timeout: Option<u64>,
    jobs: Option<usize>,
    max_depth: Option<usize>,
}

impl Config {
    /// Load configuration from a file, filling unset values with defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.merge(load_partial(path)?);
        Ok(config)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge a partially specified file into this config (file takes precedence).
    fn merge(&mut self, other: PartialConfig) {
        let sync = other.sync;
        if let Some(v) = sync.version_url {
            self.sync.version_url = v;
        }
        if let Some(v) = sync.history_url {
            self.sync.history_url = v;
        }
        if let Some(v) = sync.core_path {
            self.sync.core_path = v;
        }
        if let Some(v) = sync.libraries_path {
            self.sync.libraries_path = v;
        }
        if let Some(v) = sync.examples_path {
            self.sync.examples_path = v;
        }
        if let Some(v) = sync.connect_timeout {
            self.sync.connect_timeout = v;
        }
        if let Some(v) = sync.timeout {
            self.sync.timeout = v;
        }
        if let Some(v) = sync.jobs {
            self.sync.jobs = v.max(1);
        }
        if let Some(v) = sync.max_depth {
            self.sync.max_depth = v;
        }

        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.project_extension.is_some() {
            self.build.project_extension = other.build.project_extension;
        }

        // Defines merge key by key
        self.defines.extend(other.defines);
    }

    /// Render the compiler defines as ` -DNAME=VALUE` pairs, in key order.
    pub fn compiler_defines(&self) -> String {
        self.defines
            .iter()
            .map(|(flag, val)| format!(" -D{}={}", flag, val))
            .collect()
    }
}

fn load_partial(path: &Path) -> Result<PartialConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`<root>/fwkit.toml`)
/// 2. Global config (`~/.fwkit/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    for path in global_path.into_iter().chain(std::iter::once(project_path)) {
        if !path.exists() {
            continue;
        }
        match load_partial(path) {
            Ok(partial) => config.merge(partial),
            Err(e) => tracing::warn!("Failed to load config from {}: {:#}", path.display(), e),
        }
    }

    config
}

/// Get the global fwkit config directory (~/.fwkit).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".fwkit"))
}

/// Get the global config path (~/.fwkit/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`<root>/fwkit.toml`).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_CONFIG_FILE)
}
