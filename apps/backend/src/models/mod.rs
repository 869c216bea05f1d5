//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cardgen_core::{
    AudioReference, Card, CardRecord, Deck, DeckRecord, DomainError, DuplicateMatch, Example,
    GenerationSession, GenerationStatus, QualityReport, QualityStatistics, SessionRecord,
    Translation, Word,
};

// === Database Entity Types ===

/// Deck stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbDeck {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub max_cards_per_generation: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbDeck {
    /// Rebuild the domain deck from its row and its cards in order
    pub fn into_deck(self, cards: Vec<Card>) -> Result<Deck, DomainError> {
        Deck::try_from(DeckRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            cards,
            max_cards_per_generation: to_usize(self.max_cards_per_generation),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Card stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub deck_id: Option<Uuid>,
    pub word: String,
    pub translation: String,
    pub example_original: String,
    pub example_translated: String,
    pub audio_path: Option<String>,
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbCard {
    /// Re-validate the stored values into a domain card
    pub fn into_card(self) -> Result<Card, DomainError> {
        Card::try_from(CardRecord {
            id: self.id,
            word: Word::new(&self.word)?,
            translation: Translation::new(&self.translation)?,
            example: Example::new(&self.example_original, &self.example_translated)?,
            audio_path: self
                .audio_path
                .as_deref()
                .map(AudioReference::new)
                .transpose()?,
            context: self.context,
            deck_id: self.deck_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Generation session stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbSession {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub context: String,
    pub status: String,
    pub max_cards: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl DbSession {
    /// Rebuild the domain session from its row and its generated cards in order
    pub fn into_session(self, generated_cards: Vec<Card>) -> Result<GenerationSession, DomainError> {
        let status = GenerationStatus::from_str(&self.status).ok_or_else(|| {
            DomainError::InvalidSession(format!("unknown session status '{}'", self.status))
        })?;

        GenerationSession::try_from(SessionRecord {
            id: self.id,
            context: self.context,
            deck_id: Some(self.deck_id),
            status,
            generated_cards,
            max_cards: to_usize(self.max_cards),
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            error_message: self.error_message,
        })
    }
}

/// Deck listing row with its card count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeckSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub max_cards_per_generation: i32,
    pub card_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_usize(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

// === API Request Types ===

/// Request to create a deck
#[derive(Debug, Deserialize)]
pub struct CreateDeckRequest {
    pub title: String,
    pub description: Option<String>,
    pub max_cards_per_generation: Option<usize>,
}

/// Request to open a generation session against a deck
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub deck_id: Option<Uuid>,
    pub context: String,
    pub max_cards: Option<usize>,
}

/// Request to mark a session as failed
#[derive(Debug, Deserialize)]
pub struct FailSessionRequest {
    pub message: String,
}

/// Query for duplicate lookups
#[derive(Debug, Deserialize)]
pub struct DuplicatesQuery {
    pub threshold: Option<f64>,
}

/// Query for similar word lookups
#[derive(Debug, Deserialize)]
pub struct SimilarWordsQuery {
    pub word: String,
    pub threshold: Option<f64>,
}

// === API Response Types ===

/// Response for listing decks
#[derive(Debug, Serialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckSummary>,
}

/// Response for listing a deck's sessions
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<GenerationSession>,
}

/// Quality reports for every card of a deck
#[derive(Debug, Serialize)]
pub struct DeckQualityResponse {
    pub deck_id: Uuid,
    pub reports: Vec<QualityReport>,
    pub statistics: Option<QualityStatistics>,
}

/// Result of submitting a generated card to a session
#[derive(Debug, Serialize)]
pub struct SubmitCardResponse {
    pub card: Card,
    pub quality: QualityReport,
    pub duplicates: Vec<DuplicateMatch>,
    pub cards_generated: usize,
    pub can_add_cards: bool,
}

/// Response for duplicate and similar word lookups
#[derive(Debug, Serialize)]
pub struct DuplicatesResponse {
    pub matches: Vec<DuplicateMatch>,
}

/// Result of checking a card against the rest of its deck
#[derive(Debug, Serialize)]
pub struct UniquenessResponse {
    pub card_id: Uuid,
    pub unique: bool,
    pub problems: Vec<String>,
    pub suggestions: Vec<String>,
}
