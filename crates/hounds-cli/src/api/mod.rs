//! Ingestion API client module
//!
//! [`IngestClient`] is the seam between the orchestrator and the remote
//! service. [`BloodHoundClient`] implements it against the BloodHound CE
//! file-upload API.

pub mod chunk;
pub mod client;
pub mod endpoints;
pub mod signing;
pub mod types;

pub use client::BloodHoundClient;
pub use types::*;

use crate::error::Result;
use crate::loader::Document;
use async_trait::async_trait;
use hounds_common::types::ChunkingConfig;

/// Operations the orchestrator needs from the ingestion service
#[async_trait]
pub trait IngestClient: Send + Sync {
    /// Cheap authenticated call proving the credentials are accepted
    async fn probe_capabilities(&self) -> Result<VersionInfo>;

    /// Partition one document into chunks and jobs and upload all of it
    async fn submit(&self, document: Document, chunking: &ChunkingConfig) -> Result<SubmissionResult>;
}
