//! Resolution of the current environment name.

use crate::error::{LoadError, LoadResult};
use std::path::{Component, Path};

/// Default variable holding the environment name.
pub const DEFAULT_ENVIRONMENT_VAR: &str = "APP_ENV";

/// Supplies the name of the environment whose overlay should be applied.
pub trait EnvironmentSource {
    /// `None` means no environment is selected and no overlay applies.
    fn current_environment(&self) -> Option<String>;
}

/// A fixed environment name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedEnvironment(pub String);

impl FixedEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl EnvironmentSource for FixedEnvironment {
    fn current_environment(&self) -> Option<String> {
        non_blank(&self.0)
    }
}

/// Reads the environment name from a process environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarEnvironment {
    pub var: String,
}

impl EnvVarEnvironment {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvVarEnvironment {
    fn default() -> Self {
        Self::new(DEFAULT_ENVIRONMENT_VAR)
    }
}

impl EnvironmentSource for EnvVarEnvironment {
    fn current_environment(&self) -> Option<String> {
        std::env::var(&self.var).ok().and_then(|v| non_blank(&v))
    }
}

/// Blank names select nothing; anything else is passed through as given.
fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Reject names that would resolve to the config root itself or outside it.
///
/// Nested names such as `eu/prod` are fine; they simply select a deeper
/// directory under the root.
pub fn validate_environment(name: &str) -> LoadResult<()> {
    let mut below_root = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => below_root = true,
            Component::CurDir => {}
            _ => return Err(escapes_root(name)),
        }
    }
    if below_root {
        Ok(())
    } else {
        Err(escapes_root(name))
    }
}

fn escapes_root(name: &str) -> LoadError {
    LoadError::InvalidEnvironment {
        name: name.to_string(),
        reason: "escapes the config root",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_environment() {
        assert_eq!(
            FixedEnvironment::new("production").current_environment(),
            Some("production".to_string())
        );
        assert_eq!(FixedEnvironment::new("  ").current_environment(), None);
    }

    #[test]
    fn test_fixed_environment_is_not_trimmed() {
        assert_eq!(
            FixedEnvironment::new(" staging ").current_environment(),
            Some(" staging ".to_string())
        );
    }

    #[test]
    fn test_env_var_environment_unset() {
        let source = EnvVarEnvironment::new("CASCADING_CONFIG_TEST_SURELY_UNSET_VAR");
        assert_eq!(source.current_environment(), None);
    }

    #[test]
    fn test_env_var_default_name() {
        assert_eq!(EnvVarEnvironment::default().var, "APP_ENV");
    }

    #[test]
    fn test_validate_environment() {
        assert!(validate_environment("production").is_ok());
        assert!(validate_environment("eu-west.staging").is_ok());
        assert!(validate_environment("eu/prod").is_ok());
        assert!(validate_environment("./prod").is_ok());

        for bad in [".", "..", "../etc", "eu/../..", "/etc"] {
            let err = validate_environment(bad).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidEnvironment { .. }),
                "expected rejection for {bad:?}"
            );
        }
    }
}
