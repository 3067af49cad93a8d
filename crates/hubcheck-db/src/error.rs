//! Database error types.

use thiserror::Error;

/// Database-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Endpoint unreachable, authentication rejected or connect timed out.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Statement rejected by the engine.
    #[error("query failed: {0}")]
    Query(String),

    /// Column value could not be mapped to JSON.
    #[error("decode error in column '{column}': {reason}")]
    Decode {
        /// Column name
        column: String,
        /// Underlying decode failure
        reason: String,
    },

    /// Expected row did not show up.
    #[error("{0}")]
    NotFound(String),
}

impl DatabaseError {
    pub(crate) fn decode(column: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            column: column.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatabaseError::decode("amount", "unsupported type");
        assert_eq!(
            err.to_string(),
            "decode error in column 'amount': unsupported type"
        );

        let err = DatabaseError::Connection("connect timed out after 15s".to_string());
        assert_eq!(
            err.to_string(),
            "database connection failed: connect timed out after 15s"
        );
    }
}
