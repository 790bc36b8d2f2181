//! Reading the rating snapshot: a JSON array of rating documents.

use crate::error::Result;
use crate::record::RatingRecord;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Parse a snapshot from JSON text.
pub fn parse(text: &str) -> Result<Vec<RatingRecord>> {
    serde_json::from_str(text).context("Snapshot is not a JSON array of rating records")
}

/// Read and parse the snapshot at `path`.
pub async fn load(path: &Path) -> Result<Arc<[RatingRecord]>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let records = parse(&text).with_context(|| format!("In snapshot {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "Loaded snapshot");
    Ok(records.into())
}

/// Last modification time of the snapshot file.
pub async fn modified(path: &Path) -> Result<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to stat snapshot {}", path.display()))
}
