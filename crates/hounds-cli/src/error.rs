//! Error types for the hounds CLI
//!
//! Every variant is user-facing. Messages say what went wrong and, where
//! there is one, how to fix it.

use crate::loader::LoadError;
use hounds_common::HoundsError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Example shown whenever a URL override has the wrong shape
pub const URL_EXAMPLE: &str = "https://bloodhound.example.org:443";

#[derive(Error, Debug)]
pub enum CliError {
    /// URL override is not `scheme://host:port`
    #[error("Invalid URL '{0}': the URL must include protocol scheme and port. Example: {URL_EXAMPLE}")]
    InvalidUrl(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check the command-line flags, BHCE_* environment variables or config file.")]
    Config(String),

    /// Credentials were rejected or the endpoint could not be reached
    #[error("Failed to authenticate to the target API: {0}. Verify the token id/key and that the server is reachable.")]
    Auth(String),

    /// A collector file could not be read or parsed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A loaded document cannot be chunked
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check the server URL and your connection.")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed
    #[error("Failed to handle JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Defaults file has invalid syntax
    #[error("Failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<HoundsError> for CliError {
    fn from(err: HoundsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Create an API error
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Whether this error stops the run before any file is touched
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_) | Self::Config(_) | Self::Auth(_) | Self::TomlParse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_message_shows_format() {
        let err = CliError::InvalidUrl("bloodhound.local".to_string());
        let message = err.to_string();
        assert!(message.contains("bloodhound.local"));
        assert!(message.contains(URL_EXAMPLE));
        assert!(err.is_setup_failure());
    }

    #[test]
    fn test_common_error_becomes_config() {
        let err: CliError = HoundsError::EmptyHost.into();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_api_error_is_not_setup_failure() {
        let err = CliError::api(500, "boom");
        assert_eq!(err.to_string(), "API error (500): boom");
        assert!(!err.is_setup_failure());
    }
}
