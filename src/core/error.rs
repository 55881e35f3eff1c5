/// Empcheck Error Module
///
/// This module defines the error types shared across the crate.
/// It provides structured error handling with proper error propagation and
/// user-friendly error messages.
use thiserror::Error;

/// Error type covering every failure mode of the system check:
/// - Opening the database connection
/// - Executing the diagnostic queries
/// - Loading and validating the configuration
/// - Writing the rendered page
#[derive(Error, Debug)]
pub enum EmpcheckError {
    /// Connection-level failures: unreachable server, rejected credentials.
    /// Carries the underlying driver error; whether that detail reaches the
    /// rendered page is decided by the active profile.
    #[error("Connection error: {0}")]
    Connection(mysql_async::Error),

    /// Diagnostic query failures (missing table, malformed statement, lost
    /// session). Never fatal; the page reports these inline.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result to use EmpcheckError as the error type.
///
/// This provides a consistent error type across the entire application
/// instead of using `Result<T, String>` or mixed error types.
pub type Result<T> = std::result::Result<T, EmpcheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let query_err = EmpcheckError::Query("no such table: employee".to_string());
        assert!(query_err.to_string().contains("Query error"));
        assert!(query_err.to_string().contains("no such table"));

        let config_err = EmpcheckError::Config("unknown profile".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EmpcheckError = io_err.into();
        match err {
            EmpcheckError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }
    }
}
