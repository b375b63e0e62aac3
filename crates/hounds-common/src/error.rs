//! Error types shared across the hounds crates

use thiserror::Error;

/// Result type alias for hounds operations
pub type Result<T> = std::result::Result<T, HoundsError>;

/// Errors raised while building the shared domain types
#[derive(Error, Debug)]
pub enum HoundsError {
    #[error("Unsupported scheme '{0}': expected 'http' or 'https'")]
    InvalidScheme(String),

    #[error("Invalid port '{0}': expected an integer between 1 and 65535")]
    InvalidPort(String),

    #[error("Host must not be empty")]
    EmptyHost,

    #[error("Invalid chunking parameter '{name}': {value} (must be at least 1)")]
    InvalidChunking { name: &'static str, value: usize },
}
