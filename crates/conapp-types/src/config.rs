//! Resolver configuration loaded from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConappError, Result};

/// Settings that shape how the resolution pipeline behaves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Program name shown in help syntax lines.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Add a `help` command to every command group.
    #[serde(default = "yes")]
    pub group_help: bool,
    /// Register the root `help` group listing all groups.
    #[serde(default = "yes")]
    pub root_help: bool,
    /// A boolean parameter supplied without a value (`--pretty`) binds `true`.
    #[serde(default = "yes")]
    pub bare_flag_is_true: bool,
}

fn default_app_name() -> String {
    "conapp".to_string()
}
fn default_log_filter() -> String {
    "warn".to_string()
}
fn yes() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            log_filter: default_log_filter(),
            group_help: true,
            root_help: true,
            bare_flag_is_true: true,
        }
    }
}

impl ResolverConfig {
    /// Parse a configuration from a TOML string. Missing keys take their
    /// defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        if config.app_name.trim().is_empty() {
            return Err(ConappError::Config("app_name must not be empty".into()));
        }
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&source)
            .map_err(|e| ConappError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded resolver config from {}", path.display());
        Ok(config)
    }
}
