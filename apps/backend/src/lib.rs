pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use cardgen_core::GenerationPolicy;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub policy: GenerationPolicy,
}

/// Build the API router for `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        // Deck routes
        .route(
            "/api/decks",
            post(routes::decks::create).get(routes::decks::list),
        )
        .route(
            "/api/decks/:id",
            get(routes::decks::get).delete(routes::decks::delete),
        )
        .route("/api/decks/:id/quality", get(routes::decks::quality))
        .route("/api/decks/:id/sessions", get(routes::decks::sessions))
        // Session routes
        .route("/api/sessions", post(routes::sessions::create))
        .route("/api/sessions/:id", get(routes::sessions::get))
        .route("/api/sessions/:id/start", post(routes::sessions::start))
        .route("/api/sessions/:id/complete", post(routes::sessions::complete))
        .route("/api/sessions/:id/fail", post(routes::sessions::fail))
        .route("/api/sessions/:id/cancel", post(routes::sessions::cancel))
        .route("/api/sessions/:id/cards", post(routes::sessions::submit_card))
        // Card routes
        .route("/api/cards/:id", get(routes::cards::get))
        .route("/api/cards/:id/duplicates", get(routes::cards::duplicates))
        .route("/api/cards/:id/uniqueness", post(routes::cards::uniqueness))
        .route("/api/words/similar", get(routes::cards::similar_words))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&settings.database_url, settings.db_max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState {
        db: Arc::new(db),
        policy: settings.policy.clone(),
    };

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = settings.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
