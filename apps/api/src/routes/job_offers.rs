use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::models::job_offer::{JobOffer, JobOfferInput};
use crate::state::AppState;

/// GET /api/v1/job-offers
pub async fn handle_list_job_offers(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobOffer>>, AppError> {
    Ok(Json(state.job_offers.list().await?))
}

/// POST /api/v1/job-offers
pub async fn handle_create_job_offer(
    State(state): State<AppState>,
    Json(input): Json<JobOfferInput>,
) -> Result<(StatusCode, Json<JobOffer>), AppError> {
    let offer = state.job_offers.create(input).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

/// GET /api/v1/job-offers/:id
pub async fn handle_get_job_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobOffer>, AppError> {
    Ok(Json(state.job_offers.get(&id).await?))
}

/// PUT /api/v1/job-offers/:id
pub async fn handle_update_job_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<JobOfferInput>,
) -> Result<Json<JobOffer>, AppError> {
    Ok(Json(state.job_offers.update(&id, input).await?))
}

/// DELETE /api/v1/job-offers/:id
pub async fn handle_delete_job_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.job_offers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
