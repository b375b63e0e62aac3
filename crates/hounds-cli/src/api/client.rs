//! HTTP client for the BloodHound CE ingestion API
//!
//! Every request is signed with the run's token pair. Uploads follow the
//! file-upload job protocol: start a job, post its chunks, end the job.

use crate::api::chunk::{self, JobPlan};
use crate::api::signing::{self, RequestSigner};
use crate::api::{endpoints, types::*, IngestClient};
use crate::error::{CliError, Result};
use crate::loader::Document;
use crate::progress;
use async_trait::async_trait;
use hounds_common::types::{ChunkingConfig, Credentials, EndpointConfig};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via HOUNDS_API_TIMEOUT_SECS environment variable.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Attempts per chunk upload before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay between chunk upload attempts; grows linearly per attempt.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// How chunk uploads are retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// API client for a BloodHound CE server
pub struct BloodHoundClient {
    client: Client,
    base_url: String,
    signer: RequestSigner,
    retry: RetryPolicy,
}

impl BloodHoundClient {
    /// Create a client for a resolved endpoint
    pub fn new(endpoint: &EndpointConfig, credentials: Credentials) -> Result<Self> {
        Self::with_base_url(endpoint.base_url(), credentials)
    }

    /// Create a client for an arbitrary base URL
    pub fn with_base_url(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let timeout_secs = std::env::var("HOUNDS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            signer: RequestSigner::new(credentials),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a signed request and fail on non-success statuses
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let bytes = match body {
            Some(value) => serde_json::to_vec(value)?,
            None => Vec::new(),
        };
        let signed = self.signer.sign(method.as_str(), path, &bytes)?;

        let mut request = self
            .client
            .request(method, endpoints::url(&self.base_url, path))
            .header(USER_AGENT, signing::USER_AGENT)
            .header(AUTHORIZATION, signed.authorization)
            .header("RequestDate", signed.request_date)
            .header("Signature", signed.signature)
            .header(CONTENT_TYPE, "application/json");
        if body.is_some() {
            request = request.body(bytes);
        }

        let response = request.send().await?;
        error_for_status(response).await
    }

    /// Open an upload job and return its id
    pub async fn start_job(&self) -> Result<i64> {
        let response = self
            .send(Method::POST, endpoints::START_UPLOAD_PATH, Some(&Value::Object(Default::default())))
            .await?;
        let job: ApiResponse<UploadJob> = response.json().await?;

        debug!(job_id = job.data.id, "Started upload job");
        Ok(job.data.id)
    }

    /// Upload a single chunk into an open job
    pub async fn upload_chunk(&self, job_id: i64, chunk: &Value) -> Result<()> {
        self.send(Method::POST, &endpoints::upload_chunk_path(job_id), Some(chunk))
            .await?;
        Ok(())
    }

    /// Close a job so the server starts processing it
    pub async fn end_job(&self, job_id: i64) -> Result<()> {
        self.send(Method::POST, &endpoints::end_upload_path(job_id), None)
            .await?;
        debug!(job_id, "Ended upload job");
        Ok(())
    }

    async fn upload_chunk_with_retry(&self, job_id: i64, chunk: &Value) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.upload_chunk(job_id, chunk).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retry.max_attempts && is_retryable(&e) => {
                    warn!(job_id, attempt, error = %e, "Chunk upload failed, retrying");
                    tokio::time::sleep(self.retry.delay * attempt).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    #[instrument(skip(self, job, bar), fields(chunks = job.chunks.len(), objects = job.objects))]
    async fn submit_job(&self, job: &JobPlan, bar: &indicatif::ProgressBar) -> Result<()> {
        let job_id = self.start_job().await?;
        for chunk in &job.chunks {
            if let Err(e) = self.upload_chunk_with_retry(job_id, chunk).await {
                // Close the job anyway so it does not stay open server-side
                if let Err(end_err) = self.end_job(job_id).await {
                    warn!(job_id, error = %end_err, "Failed to close upload job after chunk failure");
                }
                return Err(e);
            }
            bar.inc(1);
        }
        self.end_job(job_id).await
    }
}

#[async_trait]
impl IngestClient for BloodHoundClient {
    async fn probe_capabilities(&self) -> Result<VersionInfo> {
        let response = self.send(Method::GET, endpoints::VERSION_PATH, None).await?;
        let version: ApiResponse<VersionResponse> = response.json().await?;
        Ok(version.data.into())
    }

    async fn submit(&self, document: Document, chunking: &ChunkingConfig) -> Result<SubmissionResult> {
        let jobs = chunk::plan_jobs(document, chunking)?;
        let total_chunks: usize = jobs.iter().map(|job| job.chunks.len()).sum();

        if jobs.is_empty() {
            info!("Document has no objects, nothing to upload");
            return Ok(SubmissionResult::default());
        }

        let bar = progress::create_progress_bar(total_chunks as u64, "Uploading chunks");
        let mut result = SubmissionResult::default();
        for job in &jobs {
            if let Err(e) = self.submit_job(job, &bar).await {
                bar.abandon();
                return Err(e);
            }
            result += SubmissionResult {
                jobs: 1,
                chunks: job.chunks.len(),
                objects: job.objects,
            };
        }
        bar.finish_and_clear();

        Ok(result)
    }
}

async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body
    };
    Err(CliError::api(status.as_u16(), message))
}

/// Transport failures, throttling and server errors are worth another try
fn is_retryable(err: &CliError) -> bool {
    match err {
        CliError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        CliError::Api { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        },
        _ => false,
    }
}
