//! Ingestion run driver
//!
//! One run goes: authenticate, discover, then for each file in discovery
//! order load, validate and submit. Files are processed strictly one after
//! another; the next file is not loaded until the previous submission has
//! finished.
//!
//! A failed credential probe aborts before any file is touched. Documents
//! that fail validation are skipped. Load and submit failures follow the
//! [`FailurePolicy`]: abort the whole run (the default) or record the
//! failure and move on.

use crate::api::{IngestClient, SubmissionResult, VersionInfo};
use crate::discover::Discoverer;
use crate::error::{CliError, Result};
use crate::loader::{load_document, Encoding};
use crate::progress::{self, format_bytes};
use crate::validate::validate;
use colored::Colorize;
use hounds_common::types::ChunkingConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

/// What to do when a file cannot be loaded or submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run with the file's error
    #[default]
    Abort,
    /// Record the failure and continue with the next file
    Continue,
}

/// Outcome of a completed run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub version: Option<VersionInfo>,
    pub discovered: usize,
    pub submitted: Vec<PathBuf>,
    pub invalid: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub totals: SubmissionResult,
}

impl RunSummary {
    /// No file failed to load or submit
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Print a human-readable report to stdout
    pub fn print(&self) {
        println!();
        println!("{}", "Summary:".cyan().bold());
        if let Some(version) = &self.version {
            println!(
                "  Server:    {} (API {})",
                version.server_version, version.api_version
            );
        }
        println!(
            "  Processed: {} of {} file(s)",
            self.submitted.len(),
            self.discovered
        );
        println!(
            "  Uploaded:  {} object(s) in {} chunk(s), {} job(s)",
            self.totals.objects, self.totals.chunks, self.totals.jobs
        );

        if !self.invalid.is_empty() {
            println!("  {} {} file(s) skipped as invalid:", "!".yellow(), self.invalid.len());
            for path in &self.invalid {
                println!("    {}", path.display());
            }
        }

        if !self.failed.is_empty() {
            println!("  {} {} file(s) failed:", "✗".red(), self.failed.len());
            for (path, reason) in &self.failed {
                println!("    {}: {}", path.display(), reason);
            }
        }
    }
}

enum FileOutcome {
    Submitted(SubmissionResult),
    Invalid,
}

/// Drives one ingestion run against an [`IngestClient`]
pub struct Orchestrator<'a, C: IngestClient + ?Sized> {
    client: &'a C,
    chunking: ChunkingConfig,
    discoverer: Discoverer,
    policy: FailurePolicy,
}

impl<'a, C: IngestClient + ?Sized> Orchestrator<'a, C> {
    pub fn new(client: &'a C, chunking: ChunkingConfig) -> Self {
        Self {
            client,
            chunking,
            discoverer: Discoverer::default(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_discoverer(mut self, discoverer: Discoverer) -> Self {
        self.discoverer = discoverer;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Authenticate, then ingest every file found at `location`
    pub async fn run(&self, location: &Path) -> Result<RunSummary> {
        let version = self
            .authenticate()
            .instrument(info_span!("authenticating"))
            .await?;

        let files = info_span!("discovering").in_scope(|| self.discoverer.discover(location));

        let mut summary = RunSummary {
            version: Some(version),
            discovered: files.len(),
            ..RunSummary::default()
        };

        for file in files {
            match self.process_file(&file).await {
                Ok(FileOutcome::Submitted(result)) => {
                    summary.totals += result;
                    summary.submitted.push(file);
                },
                Ok(FileOutcome::Invalid) => summary.invalid.push(file),
                Err(e) => match self.policy {
                    FailurePolicy::Abort => {
                        error!(file = %file.display(), error = %e, "Aborting run");
                        return Err(e);
                    },
                    FailurePolicy::Continue => {
                        warn!(file = %file.display(), error = %e, "File failed, continuing");
                        summary.failed.push((file, e.to_string()));
                    },
                },
            }
        }

        info!(
            processed = summary.submitted.len(),
            discovered = summary.discovered,
            invalid = summary.invalid.len(),
            failed = summary.failed.len(),
            "Run complete"
        );
        Ok(summary)
    }

    async fn authenticate(&self) -> Result<VersionInfo> {
        let spinner = progress::create_spinner("Testing credentials by getting API version ...");
        let probe = self.client.probe_capabilities().await;
        spinner.finish_and_clear();

        match probe {
            Ok(version) => {
                info!(
                    api_version = %version.api_version,
                    server_version = %version.server_version,
                    "Successfully authenticated to the API"
                );
                Ok(version)
            },
            Err(e) => Err(CliError::auth(e.to_string())),
        }
    }

    #[instrument(name = "processing", skip(self, path), fields(file = %path.display()))]
    async fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        info!(size = %format_bytes(size), "Loading collector data file");

        let loaded = load_document(path)?;
        if loaded.encoding == Encoding::Utf8Bom {
            debug!("Parsed after stripping a UTF-8 byte-order mark");
        }

        if !validate(&loaded.document) {
            warn!("Skipping file that does not look like collector data");
            return Ok(FileOutcome::Invalid);
        }

        let objects = loaded.document.object_count().unwrap_or(0);
        let result = self.client.submit(loaded.document, &self.chunking).await?;
        info!(
            objects,
            chunks = result.chunks,
            jobs = result.jobs,
            "Submitted file"
        );

        Ok(FileOutcome::Submitted(result))
    }
}
