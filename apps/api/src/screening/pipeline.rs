//! Screening pipeline: one résumé in, one persisted `CandidateRecord` out.
//!
//! Résumés are independent of each other. A `Semaphore` bounds how many are
//! processed at once (the embedding step dominates the cost) and all CPU work
//! happens on the blocking pool. The only shared write is the final append to
//! the candidate store, which serialises writers itself.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Datelike;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::matching::MatchingEngine;
use crate::models::candidate::{CandidateRecord, EducationEntry, ExperienceEntry, SkillEntry};
use crate::models::job_offer::JobOffer;
use crate::screening::extraction::{extract_text, ExtractionError};
use crate::screening::profile::{contact_rejection_reason, CandidateExtractor};
use crate::store::{CandidateStore, StoreError};

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Screening worker failed: {0}")]
    Worker(String),
}

/// A résumé whose text is already known, plus any structured history the
/// caller can vouch for.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub file_name: Option<String>,
    pub text: String,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<SkillEntry>,
}

/// A raw uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Per-file result of a batch screening.
#[derive(Debug)]
pub struct ScreeningOutcome {
    pub file_name: String,
    pub result: Result<CandidateRecord, ScreeningError>,
}

#[derive(Clone)]
pub struct ScreeningService {
    engine: MatchingEngine,
    store: Arc<dyn CandidateStore>,
    permits: Arc<Semaphore>,
}

impl ScreeningService {
    pub fn new(engine: MatchingEngine, store: Arc<dyn CandidateStore>, max_concurrent: usize) -> Self {
        Self {
            engine,
            store,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Screens text the caller already extracted.
    pub async fn screen(
        &self,
        submission: Submission,
        jobs: Arc<Vec<JobOffer>>,
    ) -> Result<CandidateRecord, ScreeningError> {
        let _permit = self.acquire().await?;
        let engine = self.engine.clone();

        let record = tokio::task::spawn_blocking(move || evaluate_submission(&engine, submission, &jobs))
            .await
            .map_err(|e| ScreeningError::Worker(e.to_string()))?;

        self.persist(record).await
    }

    /// Extracts text from an uploaded document, then screens it.
    pub async fn screen_file(
        &self,
        file: UploadedFile,
        jobs: Arc<Vec<JobOffer>>,
    ) -> Result<CandidateRecord, ScreeningError> {
        let _permit = self.acquire().await?;
        let engine = self.engine.clone();

        let record = tokio::task::spawn_blocking(move || {
            let text = extract_text(&file.bytes, &file.file_name, file.content_type.as_deref())?;
            let submission = Submission {
                file_name: Some(file.file_name),
                text,
                ..Submission::default()
            };
            Ok::<_, ExtractionError>(evaluate_submission(&engine, submission, &jobs))
        })
        .await
        .map_err(|e| ScreeningError::Worker(e.to_string()))??;

        self.persist(record).await
    }

    /// Screens every file as its own task. A failing file is reported in its
    /// outcome and never stops the others. Outcomes keep the input order.
    pub async fn screen_batch(
        &self,
        files: Vec<UploadedFile>,
        jobs: Arc<Vec<JobOffer>>,
    ) -> Vec<ScreeningOutcome> {
        let handles: Vec<_> = files
            .into_iter()
            .map(|file| {
                let service = self.clone();
                let jobs = Arc::clone(&jobs);
                let file_name = file.file_name.clone();
                let handle = tokio::spawn(async move { service.screen_file(file, jobs).await });
                (file_name, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (file_name, handle) in handles {
            let result = handle
                .await
                .unwrap_or_else(|e| Err(ScreeningError::Worker(e.to_string())));
            if let Err(e) = &result {
                warn!(file_name = %file_name, error = %e, "résumé could not be screened");
            }
            outcomes.push(ScreeningOutcome { file_name, result });
        }
        outcomes
    }

    async fn acquire(&self) -> Result<tokio::sync::OwnedSemaphorePermit, ScreeningError> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| ScreeningError::Worker(e.to_string()))
    }

    async fn persist(&self, record: CandidateRecord) -> Result<CandidateRecord, ScreeningError> {
        self.store.append(record.clone()).await?;
        info!(
            candidate_id = %record.id,
            file_name = record.file_name.as_deref().unwrap_or("-"),
            jobs = record.job_matches.len(),
            matched = record.has_matched(),
            globally_rejected = record.is_globally_rejected(),
            "candidate screened"
        );
        Ok(record)
    }
}

/// The synchronous core: profile, contact check, selection, scoring.
fn evaluate_submission(
    engine: &MatchingEngine,
    submission: Submission,
    jobs: &[JobOffer],
) -> CandidateRecord {
    let Submission {
        file_name,
        text,
        education,
        experience,
        skills,
    } = submission;

    let mut profile = CandidateExtractor.extract(&text);
    profile.education = education;
    profile.experience = experience;
    profile.skills = skills;

    if let Some(reason) = contact_rejection_reason(&profile) {
        return CandidateRecord::rejected(profile, file_name, reason);
    }

    let current_year = chrono::Utc::now().year();
    let evaluation = engine.evaluate(&text, &profile, jobs, current_year);

    match evaluation.selection.global_rejection_reason {
        Some(reason) => CandidateRecord::rejected(profile, file_name, reason),
        None => CandidateRecord::scored(profile, file_name, evaluation.job_matches),
    }
}
