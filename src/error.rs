use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all run-level failure modes
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Malformed XML input: {path} - {details}")]
    MalformedInput { path: PathBuf, details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No cameras survived deduplication")]
    EmptyResult,
}

impl DedupError {
    /// Input-level failures abort the whole run
    pub fn is_terminal_input_error(&self) -> bool {
        matches!(
            self,
            DedupError::InputNotFound { .. } | DedupError::MalformedInput { .. }
        )
    }
}

/// Failure of a single reachability probe. Never escalates past the checker.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("record has no url attribute")]
    MissingUrl,

    #[error("invalid URL {url}: {details}")]
    InvalidUrl { url: String, details: String },

    #[error("request timed out after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Non successful response from url (HTTP {status})")]
    UnexpectedStatus { status: u16 },
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {field} = {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Environment variable error: {0}")]
    Environment(String),
}

impl From<ConfigError> for DedupError {
    fn from(err: ConfigError) -> Self {
        DedupError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DedupError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
