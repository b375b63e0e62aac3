//! Structural check of collector documents
//!
//! The ingestion API expects every document to carry a `data` array of
//! objects and a `meta` block describing it. Anything else is rejected here
//! before it reaches the network.

use crate::loader::Document;
use tracing::warn;

/// Top-level members every document must expose
pub const REQUIRED_MEMBERS: [&str; 2] = ["data", "meta"];

/// Members from [`REQUIRED_MEMBERS`] that the document lacks
pub fn missing_members(document: &Document) -> Vec<&'static str> {
    REQUIRED_MEMBERS
        .into_iter()
        .filter(|key| document.get(key).is_none())
        .collect()
}

/// True iff the document has both `data` and `meta`
///
/// Logs troubleshooting hints on failure but never errors; skipping the
/// file is up to the caller.
pub fn validate(document: &Document) -> bool {
    let missing = missing_members(document);
    if missing.is_empty() {
        return true;
    }

    warn!(
        missing = ?missing,
        "This data does not look like valid BloodHound data"
    );
    warn!("Did you use the most recent collector?");
    warn!(
        "Are you using \"data\" as the key for objects? Old collectors used \"computers\", \"users\", etc."
    );
    false
}
