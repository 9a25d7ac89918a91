//! File-backed JSON persistence for job offers and screened candidates.
//!
//! Each store owns one JSON array on disk. Writes are read-modify-write of the
//! whole file under a `tokio::sync::Mutex`, staged in a temp file and renamed
//! into place so a crash never leaves a half-written array behind.
//!
//! Listing is lenient and skips what it cannot decode. Every write goes
//! through [`read_records_strict`] instead, so a file that does not decode
//! completely is never overwritten.

pub mod candidates;
pub mod job_offers;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub use candidates::{CandidateStore, JsonCandidateStore};
pub use job_offers::{JobOfferStore, JsonJobOfferStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialisation failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("refusing to write {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("{0}")]
    Invalid(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads every well-formed record from `path`. A missing file is an empty
/// store; malformed records are skipped; an unparseable file reads as empty.
async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path)(e)),
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            error!(path = %path.display(), error = %e, "store file is not a JSON array; treating as empty");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), index = idx, error = %e, "skipping malformed record"),
        }
    }
    Ok(records)
}

/// Reads every record from `path` for a read-modify-write. Unlike
/// [`read_records`], any file or record that fails to decode is an error.
async fn read_records_strict<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path)(e)),
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let corrupt = |reason: String| {
        error!(path = %path.display(), %reason, "store file does not decode; write refused");
        StoreError::Corrupt {
            path: path.to_path_buf(),
            reason,
        }
    };

    let values: Vec<serde_json::Value> =
        serde_json::from_str(&raw).map_err(|e| corrupt(format!("not a JSON array: {e}")))?;

    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value::<T>(value).map_err(|e| corrupt(format!("record {idx}: {e}")))
        })
        .collect()
}

/// Serialises `records` to a sibling temp file, then renames it over `path`.
async fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(io_error(parent))?;
        }
    }

    let body = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await.map_err(io_error(&tmp))?;
    tokio::fs::rename(&tmp, path).await.map_err(io_error(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        label: String,
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<Row> = read_records(&dir.path().join("absent.json")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, r#"[{"id":1,"label":"a"},{"id":"x"},{"id":2,"label":"b"}]"#)
            .await
            .unwrap();
        let rows: Vec<Row> = read_records(&path).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_garbage_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        let rows: Vec<Row> = read_records(&path).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_strict_read_rejects_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, r#"[{"id":1,"label":"a"},]"#).await.unwrap();
        let err = read_records_strict::<Row>(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_strict_read_rejects_single_bad_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, r#"[{"id":1,"label":"a"},{"id":"x"}]"#)
            .await
            .unwrap();
        match read_records_strict::<Row>(&path).await {
            Err(StoreError::Corrupt { reason, .. }) => assert!(reason.starts_with("record 1")),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_strict_read_accepts_missing_and_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        assert!(read_records_strict::<Row>(&path).await.unwrap().is_empty());
        tokio::fs::write(&path, "  \n").await.unwrap();
        assert!(read_records_strict::<Row>(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.json");
        let rows = vec![Row { id: 7, label: "x".into() }];
        write_records(&path, &rows).await.unwrap();

        let back: Vec<Row> = read_records(&path).await.unwrap();
        assert_eq!(back, rows);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
