//! Deployment-environment gate.
//!
//! `SPECDECK_INTERNAL_ENV` selects the deployment mode the CLI runs against.
//! It is validated before any command logic, help and version included; an
//! unrecognized value aborts the whole invocation.

use crate::error::CliError;

pub const INTERNAL_ENV_VAR: &str = "SPECDECK_INTERNAL_ENV";

/// Accepted deployment modes. Unset (or empty) means `Production`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployEnvironment {
    #[default]
    Production,
    Development,
    Staging,
    Test,
}

impl DeployEnvironment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }
}

/// Validate the process environment.
///
/// # Errors
///
/// Returns `CliError` when `SPECDECK_INTERNAL_ENV` holds a value outside the
/// accepted set.
pub fn validate() -> Result<DeployEnvironment, CliError> {
    validate_with(std::env::var(INTERNAL_ENV_VAR).ok().as_deref())
}

/// Testable variant of [`validate`] that accepts an explicit value.
///
/// # Errors
///
/// Returns `CliError` when `value` is present, non-empty, and not one of the
/// accepted deployment modes.
pub fn validate_with(value: Option<&str>) -> Result<DeployEnvironment, CliError> {
    match value {
        None | Some("") => Ok(DeployEnvironment::Production),
        Some("production") => Ok(DeployEnvironment::Production),
        Some("development") => Ok(DeployEnvironment::Development),
        Some("staging") => Ok(DeployEnvironment::Staging),
        Some("test") => Ok(DeployEnvironment::Test),
        Some(other) => Err(CliError::invalid_environment(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_defaults_to_production() {
        assert_eq!(validate_with(None).ok(), Some(DeployEnvironment::Production));
        assert_eq!(
            validate_with(Some("")).ok(),
            Some(DeployEnvironment::Production)
        );
    }

    #[test]
    fn accepted_values_parse() {
        for (value, expected) in [
            ("production", DeployEnvironment::Production),
            ("development", DeployEnvironment::Development),
            ("staging", DeployEnvironment::Staging),
            ("test", DeployEnvironment::Test),
        ] {
            assert_eq!(validate_with(Some(value)).ok(), Some(expected));
            assert_eq!(expected.as_str(), value);
        }
    }

    #[test]
    fn unrecognized_value_is_rejected() {
        let err = validate_with(Some("qa")).expect_err("qa is not accepted");
        assert!(err.message.contains("\"qa\""));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(validate_with(Some("Production")).is_err());
    }
}
