use thiserror::Error;

/// Result alias for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the infrastructure layer
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure while reading configuration or writing logs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tracing subscriber could not be installed
    #[error("Logging setup error: {0}")]
    Logging(String),

    /// Error annotated with context by [`ErrorExt`](super::context::ErrorExt)
    #[error("{0}")]
    Custom(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}
