use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::WordSynonyms;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SynonymRequest {
    pub document: String,
    pub words: Vec<String>,
    #[serde(default)]
    pub threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SynonymResponse {
    pub words_synonyms: Vec<WordSynonyms>,
}

/// POST /api/v1/synonyms
/// Audit view of the semantic index: which document tokens count as
/// synonyms of each word.
pub async fn handle_find_synonyms(
    State(state): State<AppState>,
    Json(req): Json<SynonymRequest>,
) -> Result<Json<SynonymResponse>, AppError> {
    if let Some(t) = req.threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(AppError::Validation(format!(
                "threshold must be between 0 and 1, got {t}"
            )));
        }
    }

    let engine = state.screening.engine().clone();
    let words_synonyms = tokio::task::spawn_blocking(move || {
        engine.find_synonyms(&req.document, &req.words, req.threshold)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in synonym search: {e}")))??;

    Ok(Json(SynonymResponse { words_synonyms }))
}
