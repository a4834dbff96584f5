//! Configuration loading and root folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: the service logs a
//! warning and continues with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PARKING_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "parking.db";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    /// Shared password for the API gate; empty disables the gate
    pub password: Option<String>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load the platform config file, falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = find_config_file() else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Values supplied on the command line (or via clap's env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub password: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub db_path: PathBuf,
    pub bind: String,
    pub port: u16,
    /// Empty string means the password gate is disabled
    pub password: String,
}

impl ServiceConfig {
    /// Merge command-line values over the config file over defaults
    pub fn resolve(cli: CliOverrides, file: TomlConfig) -> Self {
        let root_folder = resolve_root_folder(cli.root_folder.as_deref(), &file);
        let db_path = database_path(&root_folder);

        Self {
            root_folder,
            db_path,
            bind: cli
                .bind
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            password: cli.password.or(file.password).unwrap_or_default(),
        }
    }

    /// `bind:port` for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Root folder resolution: CLI, then `PARKING_ROOT_FOLDER`, then the
/// config file, then the OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, file: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &file.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Path of the ledger database inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Create the root folder if it doesn't exist
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}

/// First existing config file for the platform
///
/// Linux checks `~/.config/parking/config.toml` then
/// `/etc/parking/config.toml`; other platforms only the user config dir.
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("parking").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/parking/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\parking
        dirs::data_local_dir()
            .map(|d| d.join("parking"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\parking"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/parking
        dirs::data_dir()
            .map(|d| d.join("parking"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/parking"))
    } else {
        // ~/.local/share/parking
        dirs::data_local_dir()
            .map(|d| d.join("parking"))
            .unwrap_or_else(|| PathBuf::from("./parking_data"))
    }
}
