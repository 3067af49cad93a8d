//! Command error types.

use thiserror::Error;

/// Errors surfaced by commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A command's own check did not hold
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Database gateway failure
    #[error("database error: {0}")]
    Database(#[from] hubcheck_db::DatabaseError),

    /// Browser failure or failed UI assertion
    #[error("browser error: {0}")]
    Browser(#[from] hubcheck_browser::BrowserError),

    /// Login failure
    #[error("auth error: {0}")]
    Auth(#[from] hubcheck_auth::AuthError),

    /// Dependent API unhealthy
    #[error("health check failed: {0}")]
    Health(#[from] hubcheck_health::HealthError),

    /// Configuration, fixture or validation failure
    #[error(transparent)]
    Hub(#[from] hubcheck_core::HubError),
}

impl CommandError {
    /// Whether this is an assertion failure in either channel.
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::Assertion(_) | Self::Browser(hubcheck_browser::BrowserError::Assertion(_))
        )
    }
}

/// Result type for commands
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_kinds() {
        assert!(CommandError::Assertion("row missing".to_string()).is_assertion());
        assert!(CommandError::from(hubcheck_browser::BrowserError::Assertion(
            "expected testid=save to be visible".to_string()
        ))
        .is_assertion());
        assert!(!CommandError::from(hubcheck_db::DatabaseError::Query("syntax".to_string()))
            .is_assertion());
    }
}
