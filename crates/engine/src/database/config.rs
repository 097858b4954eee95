//! Database configuration via `memdb.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.

use memdb_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "memdb.toml";

/// Database configuration.
///
/// # Example
///
/// ```toml
/// name = "inventory"
/// track_changes = true
/// slow_commit_ms = 50
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Name attached to this database's log events.
    #[serde(default = "default_name")]
    pub name: String,
    /// Enable change tracking on every write transaction begun through the
    /// database handle.
    #[serde(default)]
    pub track_changes: bool,
    /// Commits through `Database::update` slower than this are logged at
    /// warn level. `0` disables the check.
    #[serde(default = "default_slow_commit_ms")]
    pub slow_commit_ms: u64,
}

fn default_name() -> String {
    "memdb".to_string()
}

fn default_slow_commit_ms() -> u64 {
    100
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            track_changes: false,
            slow_commit_ms: default_slow_commit_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# memdb configuration
#
# Name attached to log events from this database
name = "memdb"

# Record object-level changes in every write transaction (default: false)
track_changes = false

# Warn when a commit takes longer than this many milliseconds (0 = never)
slow_commit_ms = 100
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid TOML or a field has
    /// the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
