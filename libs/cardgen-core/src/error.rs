//! Error types for cardgen-core.

use thiserror::Error;

use crate::session::GenerationStatus;

/// Result type alias using DomainError.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Rejected constructions and rejected operations on domain objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid value: {0}")]
    InvalidValueObject(String),

    #[error("invalid card: {0}")]
    InvalidCard(String),

    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    #[error("invalid deck: {0}")]
    InvalidDeck(String),

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("generation session requires a target deck")]
    MissingDeck,

    #[error("cannot {action} a session in status {from}")]
    InvalidTransition {
        from: GenerationStatus,
        action: &'static str,
    },

    #[error("capacity of {max} cards exceeded")]
    CapacityExceeded { max: usize },

    #[error("cannot complete a session without generated cards")]
    EmptyCompletion,
}

/// Failures reported by a card store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("backend error: {0}")]
    Backend(String),
}
