//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Any storage failure other than a missing row, wrapped with the
    /// operation that hit it
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out")]
    TimedOut,
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error is passed to callers unchanged by the service layer
    ///
    /// Everything else is treated as a persistence failure and wrapped with
    /// the operation name.
    pub fn is_passthrough(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Validation(_) | Self::Cancelled | Self::TimedOut
        )
    }

    /// Wrap a persistence failure with the operation that produced it
    pub fn in_operation(self, op: &str) -> Self {
        if self.is_passthrough() {
            return self;
        }
        match self {
            Self::Database(msg) => Self::Database(format!("{}: {}", op, msg)),
            other => Self::Database(format!("{}: {}", op, other)),
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
