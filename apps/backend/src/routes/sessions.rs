//! Generation session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cardgen_core::{CardInput, GenerationSession, SessionEvent};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::generation;
use crate::AppState;

/// POST /api/sessions
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<GenerationSession>)> {
    let session = generation::open_session(&request, &state.policy)?;

    if state.db.get_deck(session.deck_id()).await?.is_none() {
        return Err(ApiError::NotFound(format!("deck {}", session.deck_id())));
    }

    state.db.insert_session(&session).await?;
    info!(session_id = %session.id(), deck_id = %session.deck_id(), max_cards = session.max_cards(), "session opened");

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/sessions/:id
pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GenerationSession>> {
    Ok(Json(load_session(&state, session_id).await?))
}

/// POST /api/sessions/:id/start
pub async fn start(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GenerationSession>> {
    transition(&state, session_id, SessionEvent::Start, None).await
}

/// POST /api/sessions/:id/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GenerationSession>> {
    transition(&state, session_id, SessionEvent::Complete, None).await
}

/// POST /api/sessions/:id/fail
pub async fn fail(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<FailSessionRequest>,
) -> Result<Json<GenerationSession>> {
    transition(&state, session_id, SessionEvent::Fail, Some(request.message)).await
}

/// POST /api/sessions/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GenerationSession>> {
    transition(&state, session_id, SessionEvent::Cancel, None).await
}

/// POST /api/sessions/:id/cards
pub async fn submit_card(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<CardInput>,
) -> Result<(StatusCode, Json<SubmitCardResponse>)> {
    let response = generation::submit_card(&state.db, &state.policy, session_id, &input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn transition(
    state: &AppState,
    session_id: Uuid,
    event: SessionEvent,
    message: Option<String>,
) -> Result<Json<GenerationSession>> {
    let mut session = load_session(state, session_id).await?;
    let previous = session.status();

    match event {
        SessionEvent::Start => session.start()?,
        SessionEvent::Complete => session.complete()?,
        SessionEvent::Fail => session.fail(message.unwrap_or_default())?,
        SessionEvent::Cancel => session.cancel()?,
    }

    state.db.update_session_state(&session, previous).await?;
    info!(%session_id, status = %session.status(), "session updated");

    Ok(Json(session))
}

async fn load_session(state: &AppState, session_id: Uuid) -> Result<GenerationSession> {
    state
        .db
        .get_session(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))
}
