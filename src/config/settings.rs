//! Settings for the loader itself.
//!
//! ## Environment Variables
//! - `CASCADING_CONFIG_ROOT` - Config root directory (default: `./config`)
//! - `CASCADING_CONFIG_ENV_VAR` - Variable naming the environment (default: `APP_ENV`)
//! - `CASCADING_CONFIG_FORMAT` - `yaml` (default) or `json`
//! - `CASCADING_CONFIG_POLICY` - `deep` (default) or `replace`

use super::environment::DEFAULT_ENVIRONMENT_VAR;
use super::merge::MergePolicy;
use super::source::SourceFormat;
use std::path::PathBuf;
use tracing::warn;

pub const ROOT_VAR: &str = "CASCADING_CONFIG_ROOT";
pub const ENV_VAR_VAR: &str = "CASCADING_CONFIG_ENV_VAR";
pub const FORMAT_VAR: &str = "CASCADING_CONFIG_FORMAT";
pub const POLICY_VAR: &str = "CASCADING_CONFIG_POLICY";

/// Where to look for configuration and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    /// Directory holding default files and one subdirectory per environment
    pub config_root: PathBuf,
    /// Process variable that names the current environment
    pub environment_var: String,
    /// File format of both tiers
    pub format: SourceFormat,
    /// How overlays combine with stored values
    pub policy: MergePolicy,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self::with_root("config")
    }
}

impl LoaderSettings {
    /// Settings with an explicit root and defaults for everything else.
    pub fn with_root(config_root: impl Into<PathBuf>) -> Self {
        Self {
            config_root: config_root.into(),
            environment_var: DEFAULT_ENVIRONMENT_VAR.to_string(),
            format: SourceFormat::default(),
            policy: MergePolicy::default(),
        }
    }

    /// Discover settings from process environment variables.
    ///
    /// Unparsable values fall back to the default with a warning.
    pub fn discover() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(root) = lookup(ROOT_VAR) {
            settings.config_root = PathBuf::from(root);
        }

        if let Some(var) = lookup(ENV_VAR_VAR).filter(|v| !v.trim().is_empty()) {
            settings.environment_var = var;
        }

        if let Some(format) = lookup(FORMAT_VAR) {
            match format.parse() {
                Ok(format) => settings.format = format,
                Err(e) => warn!("Ignoring {}: {}", FORMAT_VAR, e),
            }
        }

        if let Some(policy) = lookup(POLICY_VAR) {
            match policy.parse() {
                Ok(policy) => settings.policy = policy,
                Err(e) => warn!("Ignoring {}: {}", POLICY_VAR, e),
            }
        }

        settings
    }
}
