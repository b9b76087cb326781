//! Deduplicating incremental appender
//!
//! The one persistence mode that reads before writing: the "last draw"
//! sink merges a single new record into the day's existing JSON file,
//! rejecting duplicates by the `(hora, numero)` pair. The rewrite goes
//! through the temp-then-rename path in `storage`, and the file is
//! assumed to have a single writer (one fetcher instance per dated
//! file); concurrent writers to the same path are not supported.

use crate::error::ScrapeError;
use crate::types::DrawRecord;
use animalitos_common::storage;
use std::path::Path;
use tracing::{info, warn};

/// Append `record` to the batch at `path` unless an entry with the same
/// `(time, number)` pair already exists.
///
/// A missing or corrupt target file starts as an empty batch (logged,
/// not fatal). Returns whether the record was actually added.
pub fn append_if_new(record: &DrawRecord, path: &Path) -> Result<bool, ScrapeError> {
    let mut batch: Vec<DrawRecord> = match storage::load_json(path) {
        Some(batch) => batch,
        None => {
            if path.exists() {
                warn!(path = %path.display(), "existing file unreadable, starting fresh");
            }
            Vec::new()
        }
    };

    let duplicate = batch
        .iter()
        .any(|r| r.draw.time == record.draw.time && r.draw.number == record.draw.number);

    if duplicate {
        info!(
            path = %path.display(),
            numero = %record.draw.number,
            hora = record.draw.time.as_deref().unwrap_or("-"),
            "draw already present, skipping"
        );
        return Ok(false);
    }

    batch.push(record.clone());
    storage::save_json(&batch, path, false)?;
    info!(
        path = %path.display(),
        numero = %record.draw.number,
        total = batch.len(),
        "draw appended"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Draw, SourceMetadata};
    use tempfile::tempdir;

    fn record(time: &str, number: &str, animal: &str) -> DrawRecord {
        DrawRecord {
            draw: Draw {
                date: "2025-09-06".into(),
                time: Some(time.into()),
                animal: animal.into(),
                number: number.into(),
                color: None,
                image: None,
            },
            source: SourceMetadata {
                url: "https://example.com/".into(),
                script: "last_draw".into(),
                processed_at: "2025-09-06T12:00:00Z".into(),
            },
            validated: true,
        }
    }

    #[test]
    fn appending_twice_keeps_one_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_results_2025-09-06.json");
        let draw = record("09:00:00", "34", "Venado");

        assert!(append_if_new(&draw, &path).unwrap());
        assert!(!append_if_new(&draw, &path).unwrap());

        let batch: Vec<DrawRecord> = storage::load_json(&path).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn different_time_slots_accumulate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_results.json");

        assert!(append_if_new(&record("09:00:00", "34", "Venado"), &path).unwrap());
        assert!(append_if_new(&record("10:00:00", "34", "Venado"), &path).unwrap());
        assert!(append_if_new(&record("10:00:00", "05", "Leon"), &path).unwrap());

        let batch: Vec<DrawRecord> = storage::load_json(&path).unwrap();
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn corrupt_target_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_results.json");
        std::fs::write(&path, "esto no es json").unwrap();

        assert!(append_if_new(&record("09:00:00", "00", "Ballena"), &path).unwrap());

        let batch: Vec<DrawRecord> = storage::load_json(&path).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].draw.number, "00");
    }
}
