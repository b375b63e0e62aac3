//! API endpoint paths
//!
//! Paths are kept separate from the base URL because the request signature
//! covers the path, not the full URL.

/// API version probe
pub const VERSION_PATH: &str = "/api/v2/version";

/// Open a new upload job
pub const START_UPLOAD_PATH: &str = "/api/v2/file-upload/start";

/// Upload one chunk into an open job
pub fn upload_chunk_path(job_id: i64) -> String {
    format!("/api/v2/file-upload/{}", job_id)
}

/// Close an upload job so the server starts ingesting it
pub fn end_upload_path(job_id: i64) -> String {
    format!("/api/v2/file-upload/{}/end", job_id)
}

/// Join a base URL and an API path
pub fn url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
