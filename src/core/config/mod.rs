//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Twig has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TWIG_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/twig/config.toml`
//! 3. `~/.twig/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use twig::core::config::Config;
//! use twig::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/path/to/work"));
//! let config = Config::load(Some(&paths)).unwrap();
//!
//! println!("Initial branch: {}", config.default_branch().unwrap());
//! println!("UTC dates: {}", config.utc_dates());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::paths::RepoPaths;
use crate::core::types::BranchName;

/// Branch `init` creates when nothing is configured.
pub const DEFAULT_BRANCH: &str = "master";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules automatically. Repo config overrides
/// global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo with a config file)
    pub repo: Option<RepoConfig>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo` is provided, also loads `.twig/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(repo: Option<&RepoPaths>) -> Result<Self, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), repo)
    }

    /// Load configuration from an explicit global file location.
    pub fn load_from(global: Option<&Path>, repo: Option<&RepoPaths>) -> Result<Self, ConfigError> {
        let global = global.filter(|path| path.exists());
        let global_config = match global {
            Some(path) => Self::read_toml::<GlobalConfig>(path)?,
            None => GlobalConfig::default(),
        };

        let repo_config = match repo.map(RepoPaths::repo_config_path) {
            Some(path) if path.exists() => Some(Self::read_toml::<RepoConfig>(&path)?),
            _ => None,
        };

        global_config.validate()?;
        if let Some(ref r) = repo_config {
            r.validate()?;
        }

        tracing::debug!(
            global = ?global,
            repo = repo_config.is_some(),
            "loaded configuration"
        );

        Ok(Config {
            global: global_config,
            repo: repo_config,
        })
    }

    /// The first existing global config file, if any.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $TWIG_CONFIG
        if let Ok(path) = std::env::var("TWIG_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/twig/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("twig/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.twig/config.toml
        dirs::home_dir()
            .map(|home| home.join(".twig/config.toml"))
            .filter(|path| path.exists())
    }

    fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// The branch `init` creates.
    ///
    /// Defaults to "master".
    pub fn default_branch(&self) -> Result<BranchName, ConfigError> {
        let name = self
            .global
            .default_branch
            .as_deref()
            .unwrap_or(DEFAULT_BRANCH);
        BranchName::new(name)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid default_branch: {}", e)))
    }

    /// Whether debug diagnostics are enabled by default.
    ///
    /// Defaults to `false`.
    pub fn debug(&self) -> bool {
        self.global.debug.unwrap_or(false)
    }

    /// Whether log dates render in UTC.
    ///
    /// Repo setting wins over global. Defaults to `false` (local time).
    pub fn utc_dates(&self) -> bool {
        self.repo
            .as_ref()
            .and_then(|r| r.utc_dates)
            .or(self.global.utc_dates)
            .unwrap_or(false)
    }
}
