//! Core error types for the hubcheck suite.
//!
//! `HubError` is the error shared by crates that do not need their own enum;
//! `ConfigError` covers loading and validating the layered configuration.

use thiserror::Error;

/// Central error type for suite-level operations.
#[derive(Error, Debug)]
pub enum HubError {
    /// Config could not be loaded, merged or validated
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Fixture file missing or malformed
    #[error("fixture error ({path}): {reason}")]
    Fixture {
        /// Path of the fixture file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// A value failed a domain rule (session key, order id)
    #[error("invalid value: {0}")]
    Validation(String),

    /// Filesystem failure outside fixture loading
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading the layered config.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found at an explicitly requested path
    #[error("no config file at {path}")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// Requested profile does not exist in the config file
    #[error("unknown profile '{name}' (available: {})", available.join(", "))]
    UnknownProfile {
        /// Requested profile name
        name: String,
        /// Profiles defined in the file
        available: Vec<String>,
    },

    /// File is not valid TOML or does not match the schema
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Resolved config could not be rendered
    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Config file could not be read
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// A field or environment override has an unusable value
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted field path or variable name
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type alias using `HubError`.
pub type Result<T> = std::result::Result<T, HubError>;

/// Result of loading or validating config.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HubError::Validation("empty session key".to_string());
        assert_eq!(err.to_string(), "invalid value: empty session key");

        let err = ConfigError::UnknownProfile {
            name: "staging".to_string(),
            available: vec!["dev".to_string(), "health-check".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown profile 'staging' (available: dev, health-check)"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let config_err = ConfigError::NotFound {
            path: "hubcheck.toml".to_string(),
        };
        let hub_err: HubError = config_err.into();
        assert!(matches!(hub_err, HubError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let hub_err: HubError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "artifacts").into();
        assert!(matches!(hub_err, HubError::Io(_)));
    }
}
