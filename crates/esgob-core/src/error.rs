//! Error types for the Esgob client
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for Esgob operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Esgob client
#[derive(Error, Debug)]
pub enum Error {
    /// The API rejected the request or answered with a non-2xx status
    #[error("{message} [{}]", .code.as_deref().unwrap_or("no code"))]
    Server {
        /// Error message from the API, or the HTTP reason phrase
        message: String,
        /// Esgob error code, or the HTTP status code
        code: Option<String>,
    },

    /// Connection failures and responses that are not JSON
    #[error("{0}")]
    Transport(String),

    /// Configuration errors
    #[error("{0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON of the wrong shape for the requested operation
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// I/O errors (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a server error
    pub fn server(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Server {
            message: message.into(),
            code,
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Error code carried by a server error
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this error is a rejection from the API itself
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Whether this error came from configuration resolution
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
