//! Partitioning of a document into upload chunks and jobs
//!
//! A document's `data` array is cut into chunks of at most
//! `max_objects_per_chunk` objects, in order. Consecutive chunks are grouped
//! into jobs of at most `max_chunks_per_job` chunks. Each chunk is a
//! standalone document: its own `data` slice plus a copy of `meta` whose
//! `count` matches the slice.

use crate::error::{CliError, Result};
use crate::loader::Document;
use hounds_common::types::ChunkingConfig;
use serde_json::{Map, Value};

/// Chunks that are uploaded together under one server-side job
#[derive(Debug, Clone, PartialEq)]
pub struct JobPlan {
    pub chunks: Vec<Value>,
    pub objects: usize,
}

/// Split a document into jobs of chunks
///
/// Consumes the document so objects are moved, not copied. An empty `data`
/// array produces no jobs.
pub fn plan_jobs(document: Document, chunking: &ChunkingConfig) -> Result<Vec<JobPlan>> {
    let Value::Object(mut root) = document.into_value() else {
        return Err(CliError::invalid_document("document root is not a JSON object"));
    };

    let meta = match root.remove("meta") {
        Some(Value::Object(meta)) => meta,
        Some(_) => return Err(CliError::invalid_document("\"meta\" must be an object")),
        None => return Err(CliError::invalid_document("missing \"meta\"")),
    };
    let objects = match root.remove("data") {
        Some(Value::Array(objects)) => objects,
        Some(_) => return Err(CliError::invalid_document("\"data\" must be an array")),
        None => return Err(CliError::invalid_document("missing \"data\"")),
    };

    let chunks: Vec<(usize, Value)> = batches(objects, chunking.max_objects_per_chunk())
        .into_iter()
        .map(|slice| (slice.len(), chunk_body(slice, &meta)))
        .collect();

    Ok(batches(chunks, chunking.max_chunks_per_job())
        .into_iter()
        .map(|job| JobPlan {
            objects: job.iter().map(|(count, _)| count).sum(),
            chunks: job.into_iter().map(|(_, body)| body).collect(),
        })
        .collect())
}

fn chunk_body(objects: Vec<Value>, meta: &Map<String, Value>) -> Value {
    let mut meta = meta.clone();
    meta.insert("count".to_string(), Value::from(objects.len()));

    let mut body = Map::new();
    body.insert("data".to_string(), Value::Array(objects));
    body.insert("meta".to_string(), Value::Object(meta));
    Value::Object(body)
}

fn batches<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut out = Vec::with_capacity(items.len().div_ceil(size.max(1)));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        out.push(iter.by_ref().take(size.max(1)).collect());
    }
    out
}
