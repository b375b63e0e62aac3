//! Common types used across hounds
//!
//! Everything here is built once at startup and stays read-only for the
//! rest of the run.

use crate::error::{HoundsError, Result};
use serde::{Deserialize, Serialize};

/// Default number of objects placed in a single upload chunk.
pub const DEFAULT_OBJECTS_PER_CHUNK: usize = 250;

/// Default number of chunks grouped into a single upload job.
pub const DEFAULT_CHUNKS_PER_JOB: usize = 50;

/// Transport scheme of the ingestion API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = HoundsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(HoundsError::InvalidScheme(other.to_string())),
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved location of the ingestion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl EndpointConfig {
    /// Create an endpoint, rejecting an empty host or a zero port
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(HoundsError::EmptyHost);
        }
        if port == 0 {
            return Err(HoundsError::InvalidPort(port.to_string()));
        }

        Ok(Self { scheme, host, port })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL with an explicit port, e.g. `https://bh.example.org:443`
    pub fn base_url(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Parse a port string, rejecting zero and anything outside `u16`
pub fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(HoundsError::InvalidPort(raw.to_string())),
    }
}

/// API token pair used for request signing
///
/// The key is never printed: `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token_id: String,
    token_key: String,
}

impl Credentials {
    pub fn new(token_id: impl Into<String>, token_key: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            token_key: token_key.into(),
        }
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token_id", &"<redacted>")
            .field("token_key", &"<redacted>")
            .finish()
    }
}

/// Chunking parameters applied to every document in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    max_objects_per_chunk: usize,
    max_chunks_per_job: usize,
}

impl ChunkingConfig {
    /// Both limits must be at least 1
    pub fn new(max_objects_per_chunk: usize, max_chunks_per_job: usize) -> Result<Self> {
        if max_objects_per_chunk == 0 {
            return Err(HoundsError::InvalidChunking {
                name: "objects per chunk",
                value: max_objects_per_chunk,
            });
        }
        if max_chunks_per_job == 0 {
            return Err(HoundsError::InvalidChunking {
                name: "chunks per job",
                value: max_chunks_per_job,
            });
        }

        Ok(Self {
            max_objects_per_chunk,
            max_chunks_per_job,
        })
    }

    pub fn max_objects_per_chunk(&self) -> usize {
        self.max_objects_per_chunk
    }

    pub fn max_chunks_per_job(&self) -> usize {
        self.max_chunks_per_job
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_objects_per_chunk: DEFAULT_OBJECTS_PER_CHUNK,
            max_chunks_per_job: DEFAULT_CHUNKS_PER_JOB,
        }
    }
}
