//! Plain serializable shapes of the domain types.
//!
//! Domain types serialize through these records and deserialize back through
//! their validating constructors, so a document that round-trips through JSON
//! cannot smuggle in an invalid word, deck or session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId};
use crate::deck::{self, Deck, DeckId};
use crate::error::DomainError;
use crate::session::{self, GenerationSession, GenerationStatus, SessionId};
use crate::values::{AudioReference, Example, Translation, Word};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRecord {
    pub value: String,
}

impl TryFrom<WordRecord> for Word {
    type Error = DomainError;

    fn try_from(record: WordRecord) -> Result<Self, Self::Error> {
        Word::new(&record.value)
    }
}

impl From<Word> for WordRecord {
    fn from(word: Word) -> Self {
        Self {
            value: word.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub value: String,
}

impl TryFrom<TranslationRecord> for Translation {
    type Error = DomainError;

    fn try_from(record: TranslationRecord) -> Result<Self, Self::Error> {
        Translation::new(&record.value)
    }
}

impl From<Translation> for TranslationRecord {
    fn from(translation: Translation) -> Self {
        Self {
            value: translation.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub original: String,
    pub translated: String,
}

impl TryFrom<ExampleRecord> for Example {
    type Error = DomainError;

    fn try_from(record: ExampleRecord) -> Result<Self, Self::Error> {
        Example::new(&record.original, &record.translated)
    }
}

impl From<Example> for ExampleRecord {
    fn from(example: Example) -> Self {
        Self {
            original: example.original().to_string(),
            translated: example.translated().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioRecord {
    pub path: String,
}

impl TryFrom<AudioRecord> for AudioReference {
    type Error = DomainError;

    fn try_from(record: AudioRecord) -> Result<Self, Self::Error> {
        AudioReference::new(&record.path)
    }
}

impl From<AudioReference> for AudioRecord {
    fn from(audio: AudioReference) -> Self {
        Self {
            path: audio.path().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub word: Word,
    pub translation: Translation,
    pub example: Example,
    #[serde(default)]
    pub audio_path: Option<AudioReference>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub deck_id: Option<DeckId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CardRecord> for Card {
    type Error = DomainError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        Ok(Card {
            id: record.id,
            word: record.word,
            translation: record.translation,
            example: record.example,
            audio: record.audio_path,
            context: record.context,
            deck_id: record.deck_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            word: card.word,
            translation: card.translation,
            example: card.example,
            audio_path: card.audio,
            context: card.context,
            deck_id: card.deck_id,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckRecord {
    pub id: DeckId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    pub max_cards_per_generation: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeckRecord> for Deck {
    type Error = DomainError;

    fn try_from(record: DeckRecord) -> Result<Self, Self::Error> {
        let mut deck = Deck {
            id: record.id,
            title: deck::validate_title(&record.title)?,
            description: record.description,
            cards: record.cards,
            max_cards_per_generation: deck::validate_capacity(record.max_cards_per_generation)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
            word_counts: Default::default(),
        };
        for card in &mut deck.cards {
            card.deck_id = Some(deck.id);
        }
        deck.rebuild_word_index();
        Ok(deck)
    }
}

impl From<Deck> for DeckRecord {
    fn from(deck: Deck) -> Self {
        Self {
            id: deck.id,
            title: deck.title,
            description: deck.description,
            cards: deck.cards,
            max_cards_per_generation: deck.max_cards_per_generation,
            created_at: deck.created_at,
            updated_at: deck.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub context: String,
    pub deck_id: Option<DeckId>,
    #[serde(default)]
    pub status: GenerationStatus,
    #[serde(default)]
    pub generated_cards: Vec<Card>,
    pub max_cards: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl TryFrom<SessionRecord> for GenerationSession {
    type Error = DomainError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let max_cards = session::validate_max_cards(record.max_cards)?;
        if record.generated_cards.len() > max_cards {
            return Err(DomainError::CapacityExceeded { max: max_cards });
        }
        if record.status == GenerationStatus::Completed && record.generated_cards.is_empty() {
            return Err(DomainError::EmptyCompletion);
        }
        if record.status.is_terminal() != record.completed_at.is_some() {
            return Err(DomainError::InvalidSession(format!(
                "status {} does not match completed_at",
                record.status
            )));
        }

        let deck_id = session::validate_deck_id(record.deck_id)?;
        let mut generated_cards = record.generated_cards;
        for card in &mut generated_cards {
            card.deck_id = Some(deck_id);
        }

        Ok(GenerationSession {
            id: record.id,
            context: session::validate_context(&record.context)?,
            deck_id,
            status: record.status,
            generated_cards,
            max_cards,
            created_at: record.created_at,
            updated_at: record.updated_at,
            completed_at: record.completed_at,
            error_message: record.error_message,
        })
    }
}

impl From<GenerationSession> for SessionRecord {
    fn from(session: GenerationSession) -> Self {
        Self {
            id: session.id,
            context: session.context,
            deck_id: Some(session.deck_id),
            status: session.status,
            generated_cards: session.generated_cards,
            max_cards: session.max_cards,
            created_at: session.created_at,
            updated_at: session.updated_at,
            completed_at: session.completed_at,
            error_message: session.error_message,
        }
    }
}
