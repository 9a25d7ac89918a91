use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::{read_records, read_records_strict, write_records, StoreError};
use crate::models::candidate::CandidateRecord;

/// Append-only record of every screened résumé.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<CandidateRecord>, StoreError>;

    async fn append(&self, record: CandidateRecord) -> Result<(), StoreError>;

    /// Removes the record with `id`; `NotFound` when there is none.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub const CANDIDATES_FILE: &str = "candidates.json";

pub struct JsonCandidateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonCandidateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CANDIDATES_FILE),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl CandidateStore for JsonCandidateStore {
    async fn load_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        read_records(&self.path).await
    }

    async fn append(&self, record: CandidateRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<CandidateRecord> = read_records_strict(&self.path).await?;
        info!(candidate_id = %record.id, total = records.len() + 1, "candidate stored");
        records.push(record);
        write_records(&self.path, &records).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<CandidateRecord> = read_records_strict(&self.path).await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(format!("Candidate {id}")));
        }
        write_records(&self.path, &records).await?;
        info!(candidate_id = %id, "candidate deleted");
        Ok(())
    }
}
