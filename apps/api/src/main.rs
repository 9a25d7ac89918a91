mod config;
mod errors;
mod matching;
mod models;
mod routes;
mod screening;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::matching::embedding::EmbeddingService;
use crate::matching::normalizer::Lexicon;
use crate::matching::MatchingEngine;
use crate::routes::build_router;
use crate::screening::pipeline::ScreeningService;
use crate::state::AppState;
use crate::store::{CandidateStore, JobOfferStore, JsonCandidateStore, JsonJobOfferStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid env values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sieve API v{}", env!("CARGO_PKG_VERSION"));

    // File-backed stores
    tokio::fs::create_dir_all(&config.data_dir).await?;
    let job_offers: Arc<dyn JobOfferStore> = Arc::new(JsonJobOfferStore::new(&config.data_dir));
    let candidates: Arc<dyn CandidateStore> = Arc::new(JsonCandidateStore::new(&config.data_dir));
    info!("Data directory: {}", config.data_dir.display());

    // Matching engine (embedding model is built lazily on first résumé)
    let embeddings = EmbeddingService::new(config.embedder, config.embedding_model.clone());
    let engine = MatchingEngine::new(
        Lexicon::english(),
        embeddings,
        config.similarity_threshold,
        config.selection_policy,
    );
    info!(
        "Matching engine: embedder={:?} threshold={} policy={:?}",
        config.embedder, config.similarity_threshold, config.selection_policy
    );

    let screening = ScreeningService::new(
        engine,
        Arc::clone(&candidates),
        config.max_concurrent_screenings,
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        screening,
        job_offers,
        candidates,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict CORS origins once the recruiter UI has a fixed host
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
