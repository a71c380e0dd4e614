//! Forum configuration via `forum.toml`
//!
//! On first open, a default `forum.toml` is created in the data directory.
//! To change settings, edit the file and reopen the database.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use forumdb_core::{Error, Result};

/// Config file name placed in the forum data directory.
pub const CONFIG_FILE_NAME: &str = "forum.toml";

/// Default interval between backups (one day)
pub const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default number of posts per thread page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Deployment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Normal operation
    Production,
    /// Continuous integration: backups run on every check
    Ci,
}

/// Backup settings, the `[backup]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupConfig {
    /// Take periodic backups
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum seconds between two backups
    #[serde(default = "default_backup_interval")]
    pub interval_secs: u64,
    /// Directory for backup copies, defaults to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Keep one backup per weekday instead of a single slot
    #[serde(default = "default_true")]
    pub rotate_weekly: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_BACKUP_INTERVAL_SECS,
            dir: None,
            rotate_weekly: true,
        }
    }
}

/// Query settings, the `[query]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryConfig {
    /// Posts per thread page for paged navigation
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Upper bound on index rows read by an unbounded scan
    #[serde(default = "default_max_scan")]
    pub max_scan: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_scan: default_max_scan(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_backup_interval() -> u64 {
    DEFAULT_BACKUP_INTERVAL_SECS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_scan() -> usize {
    100_000
}

fn default_profile_str() -> String {
    "production".to_string()
}

/// Forum configuration loaded from `forum.toml`.
///
/// # Example
///
/// ```toml
/// profile = "production"
///
/// [backup]
/// enabled = true
/// interval_secs = 86400
/// rotate_weekly = true
///
/// [query]
/// default_page_size = 20
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForumConfig {
    /// Deployment profile: `"production"` or `"ci"`.
    #[serde(default = "default_profile_str")]
    pub profile: String,
    /// Backup settings
    #[serde(default)]
    pub backup: BackupConfig,
    /// Query settings
    #[serde(default)]
    pub query: QueryConfig,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_str(),
            backup: BackupConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl ForumConfig {
    /// Parse the profile string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"production"` or `"ci"`.
    pub fn profile(&self) -> Result<Profile> {
        match self.profile.as_str() {
            "production" => Ok(Profile::Production),
            "ci" => Ok(Profile::Ci),
            other => Err(Error::ConfigError(format!(
                "Invalid profile '{}' in forum.toml. Expected \"production\" or \"ci\".",
                other
            ))),
        }
    }

    /// Effective minimum time between backups. Zero under the CI profile.
    pub fn backup_interval(&self) -> Duration {
        match self.profile() {
            Ok(Profile::Ci) => Duration::ZERO,
            _ => Duration::from_secs(self.backup.interval_secs),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# forumdb configuration
#
# Profile: "production" (default) or "ci"
#   "ci" = back up on every check, ignoring interval_secs
profile = "production"

[backup]
# Take periodic copies of the database file (default: true)
enabled = true
# Minimum seconds between two backups (default: one day)
interval_secs = 86400
# Keep one copy per weekday (default: true); false keeps a single copy
rotate_weekly = true
# Directory for backup copies (default: the data directory)
# dir = "/var/backups/forum"

[query]
# Replies per page for paged thread navigation
default_page_size = 20
# Upper bound on index rows read by a single unbounded scan
max_scan = 100000
"#
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: ForumConfig = toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.profile()?;
        if self.query.default_page_size == 0 {
            return Err(Error::ConfigError(
                "query.default_page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
