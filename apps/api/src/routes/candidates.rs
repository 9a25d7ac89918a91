use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::candidate::{CandidateRecord, EducationEntry, ExperienceEntry, SkillEntry};
use crate::screening::extraction::clean_text;
use crate::screening::pipeline::{Submission, UploadedFile};
use crate::screening::summary::{summarize, UploadSummary, MAX_TOP_N};
use crate::state::AppState;

/// Multipart field carrying the résumé files.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub top_n: Option<usize>,
}

/// POST /api/v1/candidates/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadSummary>, AppError> {
    let top_n = query.top_n.unwrap_or(state.config.top_n);
    if !(1..=MAX_TOP_N).contains(&top_n) {
        return Err(AppError::Validation(format!(
            "top_n must be between 1 and {MAX_TOP_N}, got {top_n}"
        )));
    }

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation("No files sent".to_string()));
    }

    let jobs = state.job_offers.list().await?;
    if jobs.is_empty() {
        warn!("No job offers available for matching");
    }

    info!(files = files.len(), jobs = jobs.len(), top_n, "screening upload");
    let outcomes = state.screening.screen_batch(files, Arc::new(jobs)).await;
    Ok(Json(summarize(&outcomes, top_n)))
}

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    pub text: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
}

/// POST /api/v1/candidates/screen
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<CandidateRecord>, AppError> {
    let text = clean_text(&req.text);
    if text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let jobs = state.job_offers.list().await?;
    let submission = Submission {
        file_name: req.file_name,
        text,
        education: req.education,
        experience: req.experience,
        skills: req.skills,
    };
    let record = state.screening.screen(submission, Arc::new(jobs)).await?;
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateFilter {
    pub job_id: Option<String>,
    #[serde(default)]
    pub only_matched: bool,
    #[serde(default)]
    pub only_rejected: bool,
}

#[derive(Debug, Serialize)]
pub struct CandidateListItem {
    #[serde(flatten)]
    pub record: CandidateRecord,
    pub has_matched: bool,
    pub is_globally_rejected: bool,
}

#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub total_candidates: usize,
    pub returned_candidates: usize,
    pub candidates: Vec<CandidateListItem>,
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(filter): Query<CandidateFilter>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let records = state.candidates.load_all().await?;
    let total_candidates = records.len();
    let candidates = filter_candidates(records, &filter);
    Ok(Json(CandidateListResponse {
        total_candidates,
        returned_candidates: candidates.len(),
        candidates,
    }))
}

/// DELETE /api/v1/candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.candidates.delete(&id).await?;
    Ok(Json(serde_json::json!({ "status": "ok", "deleted_id": id })))
}

/// With `job_id`, only that job's verdicts are kept and candidates never
/// scored against it drop out (globally rejected ones stay). `has_matched`
/// always reflects the full record.
fn filter_candidates(records: Vec<CandidateRecord>, filter: &CandidateFilter) -> Vec<CandidateListItem> {
    records
        .into_iter()
        .filter_map(|mut record| {
            let has_matched = record.has_matched();
            let is_globally_rejected = record.is_globally_rejected();

            if let Some(job_id) = filter.job_id.as_deref().filter(|j| !j.is_empty()) {
                record.job_matches.retain(|m| m.job_id == job_id);
                if record.job_matches.is_empty() && !is_globally_rejected {
                    return None;
                }
            }

            if filter.only_matched && !has_matched {
                return None;
            }
            if filter.only_rejected && !(is_globally_rejected || record.job_matches.is_empty()) {
                return None;
            }

            Some(CandidateListItem {
                record,
                has_matched,
                is_globally_rejected,
            })
        })
        .collect()
}
