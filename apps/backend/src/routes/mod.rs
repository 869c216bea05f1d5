//! HTTP route handlers

pub mod cards;
pub mod decks;
pub mod sessions;

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
