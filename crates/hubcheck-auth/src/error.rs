//! Authentication error types.

use hubcheck_browser::BrowserError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login flow did not reach the expected page
    #[error("login failed for {email}: {reason}")]
    LoginFailed {
        /// Account that tried to log in
        email: String,
        /// What went wrong
        reason: String,
    },

    /// Credentials are unusable before any browser work
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Browser failure during the flow or while restoring a session
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;
