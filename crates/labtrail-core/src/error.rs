//! Error types for labtrail.

use thiserror::Error;

/// Result type alias using labtrail's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for labtrail operations.
///
/// "Not found" is intentionally not an error: `get`/`update` report absence
/// with `None` and `delete` with `false`, so callers can tell a missing
/// record apart from a failed operation.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed insert/update shape, rejected before any storage mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A declared parent reference does not resolve to an existing record
    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("file_size must be positive".to_string());
        assert_eq!(err.to_string(), "Validation error: file_size must be positive");
    }

    #[test]
    fn test_error_display_referential_integrity() {
        let err = Error::ReferentialIntegrity("experiment 42 does not exist".to_string());
        assert_eq!(
            err.to_string(),
            "Referential integrity violation: experiment 42 does not exist"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
