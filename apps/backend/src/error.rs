//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardgen_core::{DomainError, RepositoryError};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Domain(error) => domain_status(error),
            ApiError::Repository(RepositoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            ApiError::Repository(RepositoryError::DuplicateKey(_)) => {
                (StatusCode::CONFLICT, "duplicate_key")
            }
            ApiError::Repository(RepositoryError::Backend(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "repository_error")
            }
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

fn domain_status(error: &DomainError) -> (StatusCode, &'static str) {
    match error {
        DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
        DomainError::EmptyCompletion => (StatusCode::CONFLICT, "empty_completion"),
        DomainError::CapacityExceeded { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "capacity_exceeded")
        }
        DomainError::InvalidValueObject(_)
        | DomainError::InvalidCard(_)
        | DomainError::InvalidMutation(_)
        | DomainError::InvalidDeck(_)
        | DomainError::InvalidSession(_)
        | DomainError::MissingDeck => (StatusCode::BAD_REQUEST, "validation_error"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
