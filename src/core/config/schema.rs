//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$TWIG_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/twig/config.toml`
//! 3. `~/.twig/config.toml`
//!
//! # Repo Config
//!
//! Located at `.twig/config.toml` inside the work directory.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g. `default_branch` must be a
//! valid branch name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_branch = "main"
/// debug = false
/// utc_dates = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Branch created by `init` (default: "master")
    pub default_branch: Option<String>,

    /// Emit debug diagnostics on stderr
    pub debug: Option<bool>,

    /// Render log dates in UTC instead of local time
    pub utc_dates: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.default_branch {
            BranchName::new(branch).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid default_branch: {}", e))
            })?;
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// utc_dates = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Render log dates in UTC (overrides the global setting)
    pub utc_dates: Option<bool>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// Every repo key is a plain flag today, so this only exists to keep both
    /// scopes behind the same load path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn parse_full() {
            let config: GlobalConfig = toml::from_str(
                r#"
                default_branch = "main"
                debug = true
                utc_dates = false
                "#,
            )
            .unwrap();

            assert_eq!(config.default_branch.as_deref(), Some("main"));
            assert_eq!(config.debug, Some(true));
            assert_eq!(config.utc_dates, Some(false));
            config.validate().unwrap();
        }

        #[test]
        fn parse_empty() {
            let config: GlobalConfig = toml::from_str("").unwrap();
            assert_eq!(config, GlobalConfig::default());
        }

        #[test]
        fn invalid_default_branch() {
            let config = GlobalConfig {
                default_branch: Some("bad..name".into()),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue(_))
            ));
        }

        #[test]
        fn unknown_field_rejected() {
            let result: Result<GlobalConfig, _> = toml::from_str("trunk = \"main\"");
            assert!(result.is_err());
        }
    }

    mod repo_config {
        use super::*;

        #[test]
        fn parse() {
            let config: RepoConfig = toml::from_str("utc_dates = true").unwrap();
            assert_eq!(config.utc_dates, Some(true));
        }

        #[test]
        fn roundtrip() {
            let config = RepoConfig {
                utc_dates: Some(true),
            };
            let text = toml::to_string_pretty(&config).unwrap();
            assert_eq!(toml::from_str::<RepoConfig>(&text).unwrap(), config);
        }

        #[test]
        fn global_keys_not_allowed() {
            let result: Result<RepoConfig, _> = toml::from_str("default_branch = \"main\"");
            assert!(result.is_err());
        }
    }
}
