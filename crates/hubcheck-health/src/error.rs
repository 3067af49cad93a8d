//! Health-check error types.

use thiserror::Error;

/// Health-check errors
#[derive(Debug, Error)]
pub enum HealthError {
    /// Final attempt returned a status outside the accepted set, or failed
    /// at transport level (`status` is `None`)
    #[error("{name} is unhealthy at {url}: {}", status.map_or_else(|| "no response".to_string(), |s| format!("status {s}")))]
    Unhealthy {
        /// Endpoint name
        name: String,
        /// Checked URL
        url: String,
        /// Last observed status
        status: Option<u16>,
    },

    /// No endpoint with this name is configured
    #[error("unknown health endpoint: {0}")]
    UnknownEndpoint(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Result type for health checks
pub type Result<T> = std::result::Result<T, HealthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhealthy_display() {
        let err = HealthError::Unhealthy {
            name: "hub-api".to_string(),
            url: "http://localhost:8081/v1/version".to_string(),
            status: Some(503),
        };
        assert_eq!(
            err.to_string(),
            "hub-api is unhealthy at http://localhost:8081/v1/version: status 503"
        );

        let err = HealthError::Unhealthy {
            name: "checkout-api".to_string(),
            url: "http://localhost:8082/v1/version".to_string(),
            status: None,
        };
        assert!(err.to_string().ends_with("no response"));
    }
}
