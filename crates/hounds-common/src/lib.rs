//! Hounds Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging for the hounds workspace.
//!
//! # Overview
//!
//! - **Types**: resolved endpoint, credentials and chunking parameters
//! - **Error Handling**: [`HoundsError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use hounds_common::types::{ChunkingConfig, Credentials, EndpointConfig, Scheme};
//!
//! fn build() -> hounds_common::Result<()> {
//!     let endpoint = EndpointConfig::new(Scheme::Https, "bloodhound.example.org", 443)?;
//!     let credentials = Credentials::new("token-id", "token-key");
//!     let chunking = ChunkingConfig::new(250, 50)?;
//!     println!("{} ({:?}) {:?}", endpoint, credentials, chunking);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{HoundsError, Result};
