//! Collector file loading
//!
//! Files are parsed as strict UTF-8 JSON first. Collectors running on
//! Windows often prepend a UTF-8 byte-order mark, so a failed first attempt
//! is retried once with the mark stripped.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// UTF-8 encoded byte-order mark
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}' as JSON (with and without a byte-order mark): {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}

/// Which decoding attempt produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf8Bom,
}

/// One parsed collector file
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Top-level member, if the root is an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|root| root.get(key))
    }

    pub fn data(&self) -> Option<&Value> {
        self.get("data")
    }

    pub fn meta(&self) -> Option<&Value> {
        self.get("meta")
    }

    /// Number of objects in `data`, when it is an array
    pub fn object_count(&self) -> Option<usize> {
        self.data().and_then(Value::as_array).map(Vec::len)
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A document plus the encoding it was decoded with
#[derive(Debug)]
pub struct Loaded {
    pub document: Document,
    pub encoding: Encoding,
}

/// Parse already-read bytes
pub fn parse_document(bytes: &[u8]) -> Result<Loaded, serde_json::Error> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Ok(Loaded {
            document: Document(value),
            encoding: Encoding::Utf8,
        }),
        Err(first) => {
            let Some(rest) = bytes.strip_prefix(UTF8_BOM) else {
                return Err(first);
            };
            let value = serde_json::from_slice::<Value>(rest)?;
            Ok(Loaded {
                document: Document(value),
                encoding: Encoding::Utf8Bom,
            })
        },
    }
}

/// Read and parse one file
pub fn load_document(path: &Path) -> Result<Loaded, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
