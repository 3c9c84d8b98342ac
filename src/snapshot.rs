//! Resident data snapshot.
//!
//! A snapshot is a game feed saved to disk. It is read once per run and
//! never written back.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::comparator::GameListing;
use crate::feeds::json::parse_feed;
use crate::types::EstimateOptions;

/// Default snapshot file path.
const DEFAULT_SNAPSHOT_FILE: &str = "snapshot.json";

/// Load a game feed snapshot, applying `options` to every game.
/// Returns None if the file doesn't exist.
pub fn load_snapshot(path: Option<&str>, options: EstimateOptions) -> Result<Option<Vec<GameListing>>> {
    let path = path.unwrap_or(DEFAULT_SNAPSHOT_FILE);

    if !Path::new(path).exists() {
        info!(path, "No snapshot found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot from {path}"))?;

    let games = parse_feed(&json, options)
        .with_context(|| format!("Failed to parse snapshot from {path}"))?;

    info!(path, games = games.len(), "Snapshot loaded");
    Ok(Some(games))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
