//! Card and duplicate detection endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use cardgen_core::{Card, CardRepository, DuplicateDetectionService};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::generation::{check_uniqueness, resolve_threshold};
use crate::AppState;

/// GET /api/cards/:id
pub async fn get(State(state): State<AppState>, Path(card_id): Path<Uuid>) -> Result<Json<Card>> {
    Ok(Json(load_card(&state, card_id).await?))
}

/// GET /api/cards/:id/duplicates?threshold=
pub async fn duplicates(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Query(query): Query<DuplicatesQuery>,
) -> Result<Json<DuplicatesResponse>> {
    let threshold = resolve_threshold(query.threshold, state.policy.duplicate_threshold)?;
    let card = load_card(&state, card_id).await?;

    let matches = detector(&state)
        .find_duplicates_for_card(&card, threshold)
        .await?;
    Ok(Json(DuplicatesResponse { matches }))
}

/// GET /api/words/similar?word=&threshold=
pub async fn similar_words(
    State(state): State<AppState>,
    Query(query): Query<SimilarWordsQuery>,
) -> Result<Json<DuplicatesResponse>> {
    if query.word.trim().is_empty() {
        return Err(ApiError::BadRequest("word cannot be empty".to_string()));
    }
    let threshold = resolve_threshold(query.threshold, state.policy.similar_word_threshold)?;

    let matches = detector(&state)
        .find_similar_words(&query.word, threshold)
        .await?;
    Ok(Json(DuplicatesResponse { matches }))
}

/// POST /api/cards/:id/uniqueness
pub async fn uniqueness(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<UniquenessResponse>> {
    let card = load_card(&state, card_id).await?;

    let candidates = match card.deck_id() {
        Some(deck_id) => state.db.find_by_deck_id(deck_id).await?,
        None => state.db.find_all().await?,
    };

    Ok(Json(check_uniqueness(&detector(&state), &card, &candidates)))
}

fn detector(state: &AppState) -> DuplicateDetectionService {
    let repository: Arc<dyn CardRepository> = state.db.clone();
    DuplicateDetectionService::new(repository).with_policy(state.policy.clone())
}

async fn load_card(state: &AppState, card_id: Uuid) -> Result<Card> {
    state
        .db
        .get_card(card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("card {card_id}")))
}
