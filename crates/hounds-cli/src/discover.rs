//! Input discovery
//!
//! Turns the operator's `--location` into an ordered list of JSON files.
//! A `.zip` location is extracted and its members are returned in archive
//! order. Anything else is walked recursively for `*.json` files.
//!
//! Extraction is not sandboxed: members land in the extraction directory
//! (the working directory by default) and overwrite files left there by an
//! earlier run.

use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Suffix a location must carry to be treated as an archive
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Suffix collected when walking a directory
pub const JSON_SUFFIX: &str = ".json";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Directory '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("Error extracting JSON data from zip: '{}' may not be a valid zip file ({source})", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Collects candidate files for a run
#[derive(Debug, Clone)]
pub struct Discoverer {
    extract_dir: PathBuf,
}

impl Default for Discoverer {
    fn default() -> Self {
        Self {
            extract_dir: PathBuf::from("."),
        }
    }
}

impl Discoverer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract archives somewhere other than the working directory
    pub fn with_extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = dir.into();
        self
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Discover files, logging any problem and returning an empty list
    pub fn discover(&self, location: &Path) -> Vec<PathBuf> {
        match self.try_discover(location) {
            Ok(files) => {
                info!(location = %location.display(), files = files.len(), "Discovered input files");
                files
            },
            Err(e) => {
                warn!(error = %e, "No input files discovered");
                Vec::new()
            },
        }
    }

    pub fn try_discover(&self, location: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        if is_archive(location) {
            self.extract_archive(location)
        } else {
            walk_json_files(location)
        }
    }

    /// Extract every member and return the file members in archive order
    pub fn extract_archive(&self, archive_path: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        let archive_err = |source| DiscoveryError::Archive {
            path: archive_path.to_path_buf(),
            source,
        };

        let file = File::open(archive_path).map_err(|source| DiscoveryError::Io {
            path: archive_path.to_path_buf(),
            source,
        })?;
        let mut archive = ZipArchive::new(file).map_err(archive_err)?;

        let mut members = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(archive_err)?;
            if entry.is_dir() {
                continue;
            }
            members.push(entry.name().to_string());
        }

        archive.extract(&self.extract_dir).map_err(archive_err)?;
        debug!(
            archive = %archive_path.display(),
            dest = %self.extract_dir.display(),
            members = members.len(),
            "Extracted archive"
        );

        Ok(members
            .into_iter()
            .map(|name| self.extract_dir.join(name))
            .collect())
    }
}

/// Whether the location names a zip archive
pub fn is_archive(location: &Path) -> bool {
    location
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(ARCHIVE_SUFFIX))
}

/// Recursively collect `*.json` files in traversal order
pub fn walk_json_files(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::NotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            },
        };

        // Follows symlinks so a linked collector file is still picked up
        if !entry.path().is_file() {
            continue;
        }

        let is_json = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(JSON_SUFFIX));
        if is_json {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
