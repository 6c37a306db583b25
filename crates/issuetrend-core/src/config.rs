// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `ISSUETREND_`)
//! 2. Config file: `~/.config/issuetrend/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Fetch fewer pages at once
//! ISSUETREND_GITHUB__MAX_CONCURRENT_PAGES=2 issuetrend chart rust-lang/rust
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::IssueTrendError;

const APP_DIR: &str = "issuetrend";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User preferences.
    pub user: UserConfig,
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// UI preferences.
    pub ui: UiConfig,
    /// Cache settings.
    pub cache: CacheConfig,
}

/// User preferences.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    /// Repository charted when none is given and none was persisted.
    pub default_repo: Option<String>,
}

/// GitHub API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
    /// Issues per REST page (GitHub caps this at 100).
    pub page_size: u32,
    /// Issue pages downloaded at once.
    pub max_concurrent_pages: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_timeout_seconds: 10,
            page_size: 100,
            max_concurrent_pages: 8,
        }
    }
}

/// UI preferences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Enable colored output.
    pub color: bool,
    /// Show progress bars.
    pub progress_bars: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress_bars: true,
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Fetched repository TTL in minutes.
    pub snapshot_ttl_minutes: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_ttl_minutes: 30,
        }
    }
}

fn xdg_or_home(var: &str, fallback: &[&str]) -> PathBuf {
    if let Ok(base) = std::env::var(var)
        && !base.is_empty()
    {
        return PathBuf::from(base).join(APP_DIR);
    }
    let mut path = dirs::home_dir().expect("Could not determine home directory - is HOME set?");
    path.extend(fallback);
    path.join(APP_DIR)
}

/// Returns the configuration directory.
///
/// Respects `XDG_CONFIG_HOME` if set, otherwise `~/.config/issuetrend`.
#[must_use]
pub fn config_dir() -> PathBuf {
    xdg_or_home("XDG_CONFIG_HOME", &[".config"])
}

/// Returns the data directory holding persisted state.
///
/// Respects `XDG_DATA_HOME` if set, otherwise `~/.local/share/issuetrend`.
#[must_use]
pub fn data_dir() -> PathBuf {
    xdg_or_home("XDG_DATA_HOME", &[".local", "share"])
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration from the default file and environment.
///
/// Environment variables use the prefix `ISSUETREND_` and double underscore
/// for nested keys (e.g., `ISSUETREND_CACHE__SNAPSHOT_TTL_MINUTES`).
///
/// # Errors
///
/// Returns `IssueTrendError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, IssueTrendError> {
    load_config_from(&config_file_path())
}

/// Load application configuration from `path` (optional) and environment.
///
/// # Errors
///
/// Returns `IssueTrendError::Config` if the file exists but is invalid.
pub fn load_config_from(path: &Path) -> Result<AppConfig, IssueTrendError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("ISSUETREND")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
