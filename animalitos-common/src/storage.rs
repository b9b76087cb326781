//! JSON file persistence helpers
//!
//! Batch files are rewritten whole on every save. Writes go through a
//! temp-file-then-rename sequence so a crash mid-write never leaves a
//! truncated batch behind, and an optional `.backup` of the previous
//! file is kept (matching the behavior downstream consumers rely on).

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Serialize `value` as pretty-printed JSON at `path`.
///
/// Creates parent directories as needed. When `backup` is set and the
/// target already exists, the previous content is preserved as
/// `<name>.json.backup` before the new file lands.
pub fn save_json<T: Serialize>(value: &T, path: &Path, backup: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if backup && path.exists() {
        let backup_path = backup_path_for(path);
        fs::rename(path, &backup_path)?;
        info!(backup = %backup_path.display(), "previous file moved to backup");
    }

    let body = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &body)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), bytes = body.len(), "data saved");
    Ok(path.to_path_buf())
}

/// Load and deserialize a JSON file.
///
/// A missing file or corrupt content is logged and reported as `None`
/// rather than an error; callers that can start from an empty batch
/// (the incremental appender) rely on this.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        warn!(path = %path.display(), "file not found");
        return None;
    }

    let body = match fs::read_to_string(path) {
        Ok(body) => body,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read file");
            return None;
        }
    };

    match serde_json::from_str(&body) {
        Ok(value) => {
            debug!(path = %path.display(), "data loaded");
            Some(value)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to decode JSON");
            None
        }
    }
}

/// File size in megabytes, rounded to two decimals. 0.0 when absent.
pub fn file_size_mb(path: &Path) -> f64 {
    match fs::metadata(path) {
        Ok(meta) => {
            let mb = meta.len() as f64 / (1024.0 * 1024.0);
            (mb * 100.0).round() / 100.0
        }
        Err(_) => 0.0,
    }
}

/// Approximate serialized size of an in-memory value, in megabytes.
pub fn approx_size_mb<T: Serialize>(value: &T) -> Result<f64> {
    let bytes = serde_json::to_vec(value)?;
    Ok(bytes.len() as f64 / (1024.0 * 1024.0))
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".backup");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/batch.json");

        let data = json!([{"numero": "05", "animal": "LEON"}]);
        let saved = save_json(&data, &path, false).unwrap();
        assert!(saved.exists());

        let loaded: Value = load_json(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn save_creates_backup_of_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.json");

        save_json(&json!(["old"]), &path, true).unwrap();
        save_json(&json!(["new"]), &path, true).unwrap();

        let backup: Value = load_json(&dir.path().join("batch.json.backup")).unwrap();
        assert_eq!(backup, json!(["old"]));
        let current: Value = load_json(&path).unwrap();
        assert_eq!(current, json!(["new"]));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let loaded: Option<Value> = load_json(&dir.path().join("absent.json"));
        assert!(loaded.is_none());
    }

    #[test]
    fn load_corrupt_file_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        fs::write(&path, "{ not json").unwrap();

        let loaded: Option<Value> = load_json(&path);
        assert!(loaded.is_none());
    }

    #[test]
    fn size_of_missing_file_is_zero() {
        assert_eq!(file_size_mb(Path::new("/no/such/file.json")), 0.0);
    }

    #[test]
    fn approx_size_tracks_payload() {
        let small = json!({"a": 1});
        let size = approx_size_mb(&small).unwrap();
        assert!(size > 0.0 && size < 0.001);
    }
}
