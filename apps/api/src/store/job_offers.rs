use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::{read_records, read_records_strict, write_records, StoreError};
use crate::models::job_offer::{JobOffer, JobOfferInput};

/// Catalogue of job offers. Offers are returned in insertion order, which is
/// also the order job selection tries titles in.
#[async_trait]
pub trait JobOfferStore: Send + Sync {
    async fn list(&self) -> Result<Vec<JobOffer>, StoreError>;

    async fn get(&self, id: &str) -> Result<JobOffer, StoreError>;

    async fn create(&self, input: JobOfferInput) -> Result<JobOffer, StoreError>;

    /// Replaces the offer wholesale; requirement ids are re-minted.
    async fn update(&self, id: &str, input: JobOfferInput) -> Result<JobOffer, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub const JOB_OFFERS_FILE: &str = "job_offers.json";

pub struct JsonJobOfferStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonJobOfferStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(JOB_OFFERS_FILE),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl JobOfferStore for JsonJobOfferStore {
    async fn list(&self) -> Result<Vec<JobOffer>, StoreError> {
        read_records(&self.path).await
    }

    async fn get(&self, id: &str) -> Result<JobOffer, StoreError> {
        self.list()
            .await?
            .into_iter()
            .find(|offer| offer.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Job offer {id}")))
    }

    async fn create(&self, input: JobOfferInput) -> Result<JobOffer, StoreError> {
        input.validate().map_err(StoreError::Invalid)?;
        let offer = input.into_offer(Uuid::new_v4().to_string());

        let _guard = self.write_lock.lock().await;
        let mut offers: Vec<JobOffer> = read_records_strict(&self.path).await?;
        offers.push(offer.clone());
        write_records(&self.path, &offers).await?;

        info!(job_id = %offer.id, title = %offer.title, "job offer created");
        Ok(offer)
    }

    async fn update(&self, id: &str, input: JobOfferInput) -> Result<JobOffer, StoreError> {
        input.validate().map_err(StoreError::Invalid)?;

        let _guard = self.write_lock.lock().await;
        let mut offers: Vec<JobOffer> = read_records_strict(&self.path).await?;
        let slot = offers
            .iter_mut()
            .find(|offer| offer.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Job offer {id}")))?;
        *slot = input.into_offer(id.to_string());
        let updated = slot.clone();
        write_records(&self.path, &offers).await?;

        info!(job_id = %id, "job offer updated");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut offers: Vec<JobOffer> = read_records_strict(&self.path).await?;
        let before = offers.len();
        offers.retain(|offer| offer.id != id);
        if offers.len() == before {
            return Err(StoreError::NotFound(format!("Job offer {id}")));
        }
        write_records(&self.path, &offers).await?;
        info!(job_id = %id, "job offer deleted");
        Ok(())
    }
}
