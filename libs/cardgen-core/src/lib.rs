//! Domain core for vocabulary flashcard generation.
//!
//! Provides:
//! - Validated value types (word, translation, example sentence, audio file)
//! - Card, Deck and GenerationSession entities with their lifecycle rules
//! - Card quality scoring and duplicate detection services
//! - The card repository contract with an in-memory implementation
//! - Serializable record shapes for persistence and transport

pub mod card;
pub mod config;
pub mod deck;
pub mod duplicates;
pub mod error;
pub mod matching;
pub mod quality;
pub mod records;
pub mod repository;
pub mod session;
pub mod values;

pub use card::{Card, CardId, CardInput};
pub use config::{GenerationPolicy, MAX_CARDS_PER_GENERATION};
pub use deck::{Deck, DeckId};
pub use duplicates::{calculate_similarity, DuplicateDetectionService, DuplicateMatch};
pub use error::{DomainError, RepositoryError, Result};
pub use matching::{normalize_text, normalize_whitespace, similarity_ratio};
pub use quality::{CardQualityService, QualityLevel, QualityReport, QualityStatistics};
pub use records::{CardRecord, DeckRecord, SessionRecord};
pub use repository::{CardRepository, InMemoryCardRepository, RepositoryResult};
pub use session::{GenerationSession, GenerationStatus, SessionEvent, SessionId};
pub use values::{AudioReference, Example, Translation, Word};
