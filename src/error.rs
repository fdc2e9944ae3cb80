//! Error types for the Pub/Sub emulator sync

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Sync error types
#[derive(Error, Debug)]
pub enum Error {
    /// Connection refused, DNS failure, unreadable response body
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP status the operation did not plan for
    #[error("unexpected status code {status} in {operation}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
    },

    /// Project not found on the emulator
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Resource not found on the emulator
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Host is neither an IP nor a resolvable hostname, or has a bad port
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Emulator did not answer before the start timeout
    #[error("Time to start the emulator has been exceeded ({timeout_ms}ms)")]
    StartupTimeout { timeout_ms: u64 },

    /// Metrics encoding error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an unexpected status error
    pub fn unexpected_status(operation: &'static str, status: StatusCode) -> Self {
        Error::UnexpectedStatus { operation, status }
    }

    /// Whether the error came from the transport rather than the emulator
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
