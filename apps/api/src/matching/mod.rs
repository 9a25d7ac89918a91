//! Matching engine: résumé text + job offers → per-job verdicts.
//!
//! Leaves first: `normalizer` → `embedding` → `similarity` → `requirements`
//! → `scorer`. `selection` is independent of the rest.
//!
//! Everything here is synchronous and CPU-bound. Async callers run it inside
//! `tokio::task::spawn_blocking`.

pub mod embedding;
pub mod normalizer;
pub mod requirements;
pub mod scorer;
pub mod selection;
pub mod similarity;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::candidate::CandidateProfile;
use crate::models::job_offer::JobOffer;
use crate::models::matching::JobMatch;

use self::embedding::{EmbeddingError, EmbeddingService};
use self::normalizer::Lexicon;
use self::requirements::CandidateEvidence;
use self::scorer::{failed_job_match, score_for_job};
use self::selection::{select_jobs, JobSelectionResult, SelectionPolicy};
use self::similarity::SemanticIndex;

/// Synonyms found in a document for one query word.
#[derive(Debug, Clone, Serialize)]
pub struct WordSynonyms {
    pub word: String,
    pub synonyms: Vec<String>,
}

/// Result of evaluating one résumé against the job catalogue.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub selection: JobSelectionResult,
    pub job_matches: Vec<JobMatch>,
}

/// Owns the language resources and the embedding handle. Cheap to clone.
#[derive(Clone)]
pub struct MatchingEngine {
    lexicon: Arc<Lexicon>,
    embeddings: EmbeddingService,
    threshold: f32,
    policy: SelectionPolicy,
}

impl MatchingEngine {
    pub fn new(
        lexicon: Lexicon,
        embeddings: EmbeddingService,
        threshold: f32,
        policy: SelectionPolicy,
    ) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
            embeddings,
            threshold,
            policy,
        }
    }

    pub fn select(&self, cv_text: &str, jobs: &[JobOffer]) -> JobSelectionResult {
        select_jobs(cv_text, jobs, self.policy)
    }

    /// Embeds the document's content tokens. Acquires the model on first use.
    pub fn build_index(&self, text: &str) -> Result<SemanticIndex, EmbeddingError> {
        let embedder = self.embeddings.get()?;
        SemanticIndex::build(text, &self.lexicon, embedder)
    }

    /// Selects jobs for `cv_text` and scores each of them.
    ///
    /// Never fails as a whole: a job that cannot be scored (embedding error or
    /// panic) gets a REJECTED verdict carrying the cause, and the remaining
    /// jobs are still evaluated. If the index itself cannot be built, every
    /// selected job gets that verdict.
    pub fn evaluate(
        &self,
        cv_text: &str,
        profile: &CandidateProfile,
        jobs: &[JobOffer],
        current_year: i32,
    ) -> Evaluation {
        let selection = self.select(cv_text, jobs);
        debug!(
            selected = selection.jobs_to_consider.len(),
            explicit_title = ?selection.explicit_title,
            explicit_title_matched = selection.explicit_title_matched,
            "job selection done"
        );

        if selection.global_rejection_reason.is_some() || selection.jobs_to_consider.is_empty() {
            return Evaluation {
                selection,
                job_matches: Vec::new(),
            };
        }

        let index = match self.build_index(cv_text) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "semantic index build failed; rejecting all selected jobs");
                let cause = e.to_string();
                let job_matches = selection
                    .jobs_to_consider
                    .iter()
                    .map(|job| failed_job_match(job, &cause))
                    .collect();
                return Evaluation {
                    selection,
                    job_matches,
                };
            }
        };

        debug!(
            indexed_tokens = index.len(),
            jobs = selection.jobs_to_consider.len(),
            "scoring résumé"
        );
        let evidence = CandidateEvidence::new(cv_text, profile, &index, self.threshold, current_year);
        let job_matches = selection
            .jobs_to_consider
            .iter()
            .map(|job| score_guarded(&evidence, job))
            .collect();

        Evaluation {
            selection,
            job_matches,
        }
    }

    /// For each word, the document tokens semantically close to it.
    pub fn find_synonyms(
        &self,
        document: &str,
        words: &[String],
        threshold: Option<f32>,
    ) -> Result<Vec<WordSynonyms>, EmbeddingError> {
        let threshold = threshold.unwrap_or(self.threshold);
        let index = self.build_index(document)?;
        words
            .iter()
            .map(|word| {
                Ok(WordSynonyms {
                    word: word.clone(),
                    synonyms: index.find_synonyms(word, threshold)?,
                })
            })
            .collect()
    }
}

fn score_guarded(evidence: &CandidateEvidence<'_>, job: &JobOffer) -> JobMatch {
    match panic::catch_unwind(AssertUnwindSafe(|| score_for_job(evidence, job))) {
        Ok(Ok(job_match)) => job_match,
        Ok(Err(e)) => {
            warn!(job_id = %job.id, error = %e, "scoring failed");
            failed_job_match(job, &e.to_string())
        }
        Err(payload) => {
            let cause = panic_message(payload.as_ref());
            warn!(job_id = %job.id, cause = %cause, "scoring panicked");
            failed_job_match(job, &cause)
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
