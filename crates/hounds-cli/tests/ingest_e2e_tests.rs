//! End-to-end tests for the hounds binary
//!
//! These tests drive the real binary against a mock BloodHound API:
//! - Configuration failures (bad URL, rejected credentials)
//! - Directory and zip discovery
//! - Validation skips and load failures
//! - Chunk and job accounting

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::{
    matchers::{header, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Helper to build a command isolated from the developer's environment
fn hounds(workdir: &Path) -> Command {
    let config = workdir.join("hounds.toml");
    if !config.exists() {
        fs::write(&config, "").expect("Failed to create empty config");
    }

    let mut cmd = Command::cargo_bin("hounds").expect("binary should be built");
    cmd.current_dir(workdir)
        .env_remove("BHCE_SCHEME")
        .env_remove("BHCE_DOMAIN")
        .env_remove("BHCE_PORT")
        .env_remove("BHCE_TOKEN_ID")
        .env_remove("BHCE_TOKEN_KEY")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config)
        .arg("--tokenid")
        .arg("0f1e2d3c-token")
        .arg("--tokenkey")
        .arg("c2VjcmV0LWtleQ==");
    cmd
}

/// Helper to create a collector output directory
fn collector_dir(root: &TempDir, files: &[(&str, &[u8])]) -> PathBuf {
    let dir = root.path().join("collector");
    for (name, contents) in files {
        let file = dir.join(name);
        fs::create_dir_all(file.parent().expect("file has a parent"))
            .expect("Failed to create collector dir");
        fs::write(&file, contents).expect("Failed to write collector file");
    }
    fs::create_dir_all(&dir).expect("Failed to create collector dir");
    dir
}

fn version_response() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "API": {"current_version": "v2", "deprecated_version": "v1"},
            "server_version": "v5.15.0"
        }
    })
}

async fn mount_version(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/version"))
        .and(header("Authorization", "bhesignature 0f1e2d3c-token"))
        .and(header_exists("Signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_response()))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount the upload job protocol, expecting exact call counts
async fn mount_uploads(server: &MockServer, jobs: u64, chunks: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v2/file-upload/start"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"data": {"id": 1}})))
        .expect(jobs)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/file-upload/1"))
        .and(header_exists("Signature"))
        .respond_with(ResponseTemplate::new(202))
        .expect(chunks)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/file-upload/1/end"))
        .respond_with(ResponseTemplate::new(200))
        .expect(jobs)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_directory_valid_file_uploaded_invalid_skipped() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    // a.json: 3 objects, 2 per chunk, 1 chunk per job
    mount_uploads(&server, 2, 2).await;

    let root = TempDir::new().unwrap();
    let dir = collector_dir(
        &root,
        &[
            ("a.json", br#"{"data":[1,2,3],"meta":{}}"#),
            ("b.json", br#"{"computers":[],"meta":{}}"#),
            ("notes.txt", b"not collector output"),
        ],
    );

    hounds(root.path())
        .arg("-l")
        .arg(&dir)
        .arg("-u")
        .arg(server.uri())
        .arg("-c")
        .arg("2")
        .arg("-j")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 1 of 2 file(s)"))
        .stdout(predicate::str::contains("3 object(s) in 2 chunk(s), 2 job(s)"))
        .stdout(predicate::str::contains("Server:    v5.15.0 (API v2)"))
        .stdout(predicate::str::contains("b.json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_url_exits_before_network() {
    let root = TempDir::new().unwrap();
    let dir = collector_dir(&root, &[("a.json", br#"{"data":[],"meta":{}}"#)]);

    hounds(root.path())
        .arg("-l")
        .arg(&dir)
        .arg("-u")
        .arg("bloodhound.example.org")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "must include protocol scheme and port",
        ))
        .stderr(predicate::str::contains("No files were processed."))
        .stdout(predicate::str::contains("Connecting to").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_credentials_process_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/version"))
        .respond_with(ResponseTemplate::new(401).set_body_string("authentication is invalid"))
        .expect(1)
        .mount(&server)
        .await;
    mount_uploads(&server, 0, 0).await;

    let root = TempDir::new().unwrap();
    let dir = collector_dir(&root, &[("a.json", br#"{"data":[1],"meta":{}}"#)]);

    hounds(root.path())
        .arg("-l")
        .arg(&dir)
        .arg("-u")
        .arg(server.uri())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to authenticate"))
        .stderr(predicate::str::contains("No files were processed."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_zip_archive_is_extracted_and_uploaded() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_uploads(&server, 2, 2).await;

    let root = TempDir::new().unwrap();
    let archive = root.path().join("20261017_BloodHound.zip");
    let mut zip = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
    for name in ["20261017_users.json", "20261017_computers.json"] {
        zip.start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(br#"{"data":[{"ObjectIdentifier":"S-1-5-21-1"}],"meta":{"type":"users"}}"#)
            .unwrap();
    }
    zip.finish().unwrap();

    let extract_dir = root.path().join("extracted");
    fs::create_dir(&extract_dir).unwrap();

    hounds(root.path())
        .arg("-l")
        .arg(&archive)
        .arg("-u")
        .arg(server.uri())
        .arg("--extract-dir")
        .arg(&extract_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 2 of 2 file(s)"));

    assert!(extract_dir.join("20261017_users.json").is_file());
    assert!(extract_dir.join("20261017_computers.json").is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_corrupt_archive_is_a_noop_run() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_uploads(&server, 0, 0).await;

    let root = TempDir::new().unwrap();
    let archive = root.path().join("broken.zip");
    fs::write(&archive, "this is not a zip").unwrap();

    hounds(root.path())
        .arg("-l")
        .arg(&archive)
        .arg("-u")
        .arg(server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 0 of 0 file(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bom_prefixed_file_is_uploaded() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_uploads(&server, 1, 1).await;

    let mut contents = vec![0xEF, 0xBB, 0xBF];
    contents.extend_from_slice(br#"{"data":[{"ObjectIdentifier":"S-1-5-21-9"}],"meta":{"type":"groups"}}"#);

    let root = TempDir::new().unwrap();
    let dir = collector_dir(&root, &[("groups.json", &contents)]);

    hounds(root.path())
        .arg("-l")
        .arg(&dir)
        .arg("-u")
        .arg(server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 1 of 1 file(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unparseable_file_aborts_run() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_uploads(&server, 0, 0).await;

    let root = TempDir::new().unwrap();
    let dir = collector_dir(&root, &[("broken.json", b"{\"data\": [")]);

    hounds(root.path())
        .arg("-l")
        .arg(&dir)
        .arg("-u")
        .arg(server.uri())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"))
        .stdout(predicate::str::contains("Summary:").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keep_going_uploads_remaining_files() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_uploads(&server, 1, 1).await;

    let root = TempDir::new().unwrap();
    let dir = collector_dir(
        &root,
        &[
            ("x/broken.json", b"not json at all"),
            ("y/users.json", br#"{"data":[{"id":1}],"meta":{}}"#),
        ],
    );

    hounds(root.path())
        .arg("-l")
        .arg(&dir)
        .arg("-u")
        .arg(server.uri())
        .arg("--keep-going")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Processed: 1 of 2 file(s)"))
        .stdout(predicate::str::contains("1 file(s) failed"));
}

#[test]
fn test_zero_chunk_size_is_rejected() {
    let root = TempDir::new().unwrap();

    hounds(root.path())
        .arg("-l")
        .arg(root.path())
        .arg("-u")
        .arg("http://127.0.0.1:9")
        .arg("-c")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("objects per chunk"));
}
