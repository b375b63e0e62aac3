//! Hounds CLI Library
//!
//! Uploads collector JSON output (zip archives or directories of `*.json`
//! files) to a BloodHound CE instance through its file-upload API.
//!
//! # Overview
//!
//! - **Resolution**: endpoint and token pair from flags, environment or a
//!   defaults file ([`config`])
//! - **Discovery**: archive extraction or recursive directory walk
//!   ([`discover`])
//! - **Loading**: JSON parsing with a byte-order-mark fallback ([`loader`])
//! - **Validation**: `data` / `meta` shape check ([`validate`])
//! - **Submission**: chunked, signed uploads ([`api`]) driven file by file
//!   ([`orchestrator`])

pub mod api;
pub mod config;
pub mod discover;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod progress;
pub mod validate;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use loader::Document;
pub use orchestrator::{FailurePolicy, Orchestrator, RunSummary};

use api::BloodHoundClient;
use clap::Parser;
use colored::Colorize;
use config::{Defaults, Overrides};
use discover::Discoverer;
use hounds_common::types::{ChunkingConfig, DEFAULT_CHUNKS_PER_JOB, DEFAULT_OBJECTS_PER_CHUNK};
use std::path::PathBuf;
use tracing::info_span;

/// Upload collector JSON files to BloodHound CE in chunks
#[derive(Parser, Debug)]
#[command(name = "hounds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Zip file, or directory searched recursively, holding the JSON files
    #[arg(short, long)]
    pub location: PathBuf,

    /// Base API URL including scheme and port, e.g. https://bloodhound.example.org:443
    #[arg(short, long)]
    pub url: Option<String>,

    /// API token id (looks like a GUID)
    #[arg(short = 'i', long = "tokenid", env = "BHCE_TOKEN_ID", hide_env_values = true)]
    pub token_id: Option<String>,

    /// API token key (looks like a base64 blob)
    #[arg(short = 'k', long = "tokenkey", env = "BHCE_TOKEN_KEY", hide_env_values = true)]
    pub token_key: Option<String>,

    /// Number of objects in each chunk
    #[arg(short = 'c', long = "chunkobjects", default_value_t = DEFAULT_OBJECTS_PER_CHUNK)]
    pub chunk_objects: usize,

    /// Number of chunks in each job
    #[arg(short = 'j', long = "chunksinjob", default_value_t = DEFAULT_CHUNKS_PER_JOB)]
    pub chunks_in_job: usize,

    /// Defaults file (TOML) with scheme, host, port, token_id, token_key
    #[arg(long, env = "HOUNDS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory zip archives are extracted into
    #[arg(long, default_value = ".")]
    pub extract_dir: PathBuf,

    /// Keep processing remaining files when one fails to load or upload
    #[arg(long)]
    pub keep_going: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            token_id: self.token_id.clone(),
            token_key: self.token_key.clone(),
        }
    }

    fn policy(&self) -> FailurePolicy {
        if self.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        }
    }
}

/// Resolve configuration, then run the ingestion pipeline
///
/// Configuration problems are reported before any network call is made.
pub async fn run(cli: &Cli) -> Result<RunSummary> {
    let resolved = info_span!("resolving").in_scope(|| -> Result<_> {
        let defaults = Defaults::load(cli.config.as_deref())?;
        config::resolve(&defaults, &cli.overrides())
    })?;
    let chunking = ChunkingConfig::new(cli.chunk_objects, cli.chunks_in_job)?;

    println!("{} Connecting to: {}", "→".cyan(), resolved.endpoint);

    let client = BloodHoundClient::new(&resolved.endpoint, resolved.credentials)?;
    Orchestrator::new(&client, chunking)
        .with_discoverer(Discoverer::new().with_extract_dir(&cli.extract_dir))
        .with_policy(cli.policy())
        .run(&cli.location)
        .await
}
