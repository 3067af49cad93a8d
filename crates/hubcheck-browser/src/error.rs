use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("uncaught page error: {0}")]
    PageError(String),
}

impl BrowserError {
    /// Errors a condition wait keeps polling through.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SelectorNotFound(_))
    }
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::ChromiumError(err.to_string())
    }
}
