pub mod candidates;
pub mod health;
pub mod job_offers;
pub mod synonyms;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Upper bound for one multipart upload request (many résumés at once).
pub const MAX_UPLOAD_BODY_BYTES: usize = 256 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job offers
        .route(
            "/api/v1/job-offers",
            get(job_offers::handle_list_job_offers).post(job_offers::handle_create_job_offer),
        )
        .route(
            "/api/v1/job-offers/:id",
            get(job_offers::handle_get_job_offer)
                .put(job_offers::handle_update_job_offer)
                .delete(job_offers::handle_delete_job_offer),
        )
        // Candidates
        .route("/api/v1/candidates", get(candidates::handle_list_candidates))
        .route(
            "/api/v1/candidates/upload",
            post(candidates::handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/v1/candidates/screen", post(candidates::handle_screen))
        .route(
            "/api/v1/candidates/:id",
            delete(candidates::handle_delete_candidate),
        )
        // Semantic index audit
        .route("/api/v1/synonyms", post(synonyms::handle_find_synonyms))
        .with_state(state)
}
