//! Deck endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cardgen_core::{CardQualityService, Deck};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::generation::resolve_max_cards;
use crate::AppState;

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<Deck>)> {
    let max_cards = resolve_max_cards(request.max_cards_per_generation, &state.policy);
    let deck = Deck::new(&request.title, request.description.as_deref(), max_cards)?;

    state.db.insert_deck(&deck).await?;
    info!(deck_id = %deck.id(), title = deck.title(), "deck created");

    Ok((StatusCode::CREATED, Json(deck)))
}

/// GET /api/decks
pub async fn list(State(state): State<AppState>) -> Result<Json<DeckListResponse>> {
    let decks = state.db.list_decks().await?;
    Ok(Json(DeckListResponse { decks }))
}

/// GET /api/decks/:id
pub async fn get(State(state): State<AppState>, Path(deck_id): Path<Uuid>) -> Result<Json<Deck>> {
    let deck = load_deck(&state, deck_id).await?;
    Ok(Json(deck))
}

/// DELETE /api/decks/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_deck(deck_id).await? {
        return Err(ApiError::NotFound(format!("deck {deck_id}")));
    }
    info!(%deck_id, "deck deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/decks/:id/quality
pub async fn quality(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeckQualityResponse>> {
    let deck = load_deck(&state, deck_id).await?;

    let service = CardQualityService::new();
    let reports = service.batch_evaluate(deck.cards());
    let statistics = service.get_quality_statistics(&reports);

    Ok(Json(DeckQualityResponse {
        deck_id,
        reports,
        statistics,
    }))
}

/// GET /api/decks/:id/sessions
pub async fn sessions(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<SessionListResponse>> {
    load_deck(&state, deck_id).await?;
    let sessions = state.db.list_sessions_for_deck(deck_id).await?;
    Ok(Json(SessionListResponse { sessions }))
}

async fn load_deck(state: &AppState, deck_id: Uuid) -> Result<Deck> {
    state
        .db
        .get_deck(deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deck {deck_id}")))
}
