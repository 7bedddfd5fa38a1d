//! Configuration loading and database path resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the database file
pub const DATABASE_ENV_VAR: &str = "DENTDIR_DATABASE";

/// Database file name used under the default data directory
pub const DEFAULT_DATABASE_FILE: &str = "dentdir.db";

/// Optional settings read from `config.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    /// Path to the SQLite database holding `dentists` and `pages`
    pub database_path: Option<PathBuf>,
    /// Listen address for the read API (e.g. "127.0.0.1:5730")
    pub bind_addr: Option<String>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a config file. Missing optional keys fall back to `None`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the first config file found in the platform search path.
    /// A missing or unreadable file yields the empty config.
    pub fn discover() -> Self {
        match config_file_path() {
            Some(path) => match Self::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}

/// Database path resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder().join(DEFAULT_DATABASE_FILE)
}

/// Locate `config.toml`: user config dir first, then /etc on Linux
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("dentdir").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/dentdir/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/dentdir (or /var/lib/dentdir for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("dentdir"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dentdir"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dentdir"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dentdir"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dentdir"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dentdir"))
    } else {
        PathBuf::from("./dentdir_data")
    }
}
