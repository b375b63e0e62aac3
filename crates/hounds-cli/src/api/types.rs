//! API request and response types
//!
//! Matches the BloodHound CE v2 API.

use serde::{Deserialize, Serialize};

/// Standard `{"data": ...}` response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Body of `GET /api/v2/version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    #[serde(rename = "API")]
    pub api: ApiVersions,
    pub server_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVersions {
    pub current_version: String,
    #[serde(default)]
    pub deprecated_version: Option<String>,
}

/// What the capability probe learned about the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub api_version: String,
    pub server_version: String,
}

impl From<VersionResponse> for VersionInfo {
    fn from(resp: VersionResponse) -> Self {
        Self {
            api_version: resp.api.current_version,
            server_version: resp.server_version,
        }
    }
}

/// Body of `POST /api/v2/file-upload/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJob {
    pub id: i64,
    #[serde(default)]
    pub status: Option<i64>,
}

/// Totals for one submitted document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionResult {
    pub jobs: usize,
    pub chunks: usize,
    pub objects: usize,
}

impl std::ops::AddAssign for SubmissionResult {
    fn add_assign(&mut self, other: Self) {
        self.jobs += other.jobs;
        self.chunks += other.chunks;
        self.objects += other.objects;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_version_response_deserialization() {
        let body = serde_json::json!({
            "data": {
                "API": {"current_version": "v2", "deprecated_version": "v1"},
                "server_version": "v5.15.0"
            }
        });

        let resp: ApiResponse<VersionResponse> = serde_json::from_value(body).unwrap();
        let info = VersionInfo::from(resp.data);
        assert_eq!(info.api_version, "v2");
        assert_eq!(info.server_version, "v5.15.0");
    }

    #[test]
    fn test_upload_job_ignores_extra_fields() {
        let body = serde_json::json!({
            "data": {"id": 17, "user_id": "abc", "status": 0, "total_files": 0}
        });

        let resp: ApiResponse<UploadJob> = serde_json::from_value(body).unwrap();
        assert_eq!(resp.data.id, 17);
    }

    #[test]
    fn test_submission_result_accumulates() {
        let mut total = SubmissionResult::default();
        total += SubmissionResult { jobs: 1, chunks: 2, objects: 3 };
        total += SubmissionResult { jobs: 1, chunks: 1, objects: 1 };
        assert_eq!(total, SubmissionResult { jobs: 2, chunks: 3, objects: 4 });
    }
}
