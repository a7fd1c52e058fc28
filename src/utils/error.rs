//! Error types for Seltag
//!
//! Only the collaborator boundary (network, extraction, notification,
//! configuration) returns these. The tagging core absorbs its own failures.

use thiserror::Error;

/// Main error type for Seltag operations
#[derive(Debug, Error)]
pub enum SeltagError {
    /// Page fetch errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    /// Parsing/selector errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    /// Extraction collaborator failure
    #[error("Extraction failed: {0}")]
    Extraction(String),
    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Selector files and JSON output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Network-specific errors
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// HTTP error with status code
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// Response was not an HTML document
    #[error("response is not HTML (content-type: {0})")]
    NotHtml(String),
    /// Transport-level failure
    #[error("request failed: {0}")]
    Request(String),
}

/// Rendering-specific errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Selector rejected by the query engine
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Notification-specific errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A required credential or destination is missing
    #[error("missing credential: {0}")]
    MissingCredential(String),
    /// The remote service answered with a failure status
    #[error("{channel} rejected the message ({status}): {body}")]
    Rejected {
        channel: String,
        status: u16,
        body: String,
    },
    /// The message could not be built (bad address, encoding)
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    /// Transport-level failure
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http(status.as_u16(), err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Convenience Result type for Seltag operations
pub type Result<T> = std::result::Result<T, SeltagError>;
