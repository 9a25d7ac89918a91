use std::sync::Arc;

use crate::config::Config;
use crate::screening::pipeline::ScreeningService;
use crate::store::{CandidateStore, JobOfferStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the matching engine and the concurrency limit for résumé screening.
    pub screening: ScreeningService,
    pub job_offers: Arc<dyn JobOfferStore>,
    pub candidates: Arc<dyn CandidateStore>,
}
