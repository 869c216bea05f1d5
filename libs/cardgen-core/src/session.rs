//! Generation sessions: bounded units of work that produce cards for a deck.
//!
//! # Lifecycle
//! ```text
//! Pending ──start──▶ InProgress ──complete──▶ Completed
//!    │                   │
//!    └──fail / cancel────┴──────────────────▶ Failed / Cancelled
//! ```
//! Completed, Failed and Cancelled are terminal. Cards may be submitted while
//! the session is Pending or InProgress.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::card::Card;
use crate::config::{GenerationPolicy, MAX_CARDS_PER_GENERATION};
use crate::deck::{Deck, DeckId};
use crate::error::{DomainError, Result};
use crate::records::SessionRecord;

/// Session identifier.
pub type SessionId = Uuid;

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl Default for GenerationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Lifecycle events a session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Complete,
    Fail,
    Cancel,
}

impl SessionEvent {
    fn action(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Cancel => "cancel",
        }
    }
}

impl GenerationStatus {
    /// Get the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn accepts_cards(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// The status reached by applying `event`, or the reason it is refused.
    pub fn transition(self, event: SessionEvent) -> Result<Self> {
        use GenerationStatus::*;

        match (self, event) {
            (Pending, SessionEvent::Start) => Ok(InProgress),
            (InProgress, SessionEvent::Complete) => Ok(Completed),
            (Pending | InProgress, SessionEvent::Fail) => Ok(Failed),
            (Pending | InProgress, SessionEvent::Cancel) => Ok(Cancelled),
            (from, event) => Err(DomainError::InvalidTransition {
                from,
                action: event.action(),
            }),
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded batch of generated cards targeting one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct GenerationSession {
    pub(crate) id: SessionId,
    pub(crate) context: String,
    pub(crate) deck_id: DeckId,
    pub(crate) status: GenerationStatus,
    pub(crate) generated_cards: Vec<Card>,
    pub(crate) max_cards: usize,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) error_message: Option<String>,
}

impl GenerationSession {
    /// Create a pending session. A missing or nil deck id is rejected with
    /// [`DomainError::MissingDeck`].
    pub fn new(context: &str, deck_id: Option<DeckId>, max_cards: usize) -> Result<Self> {
        let context = validate_context(context)?;
        let deck_id = validate_deck_id(deck_id)?;
        let max_cards = validate_max_cards(max_cards)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            context,
            deck_id,
            status: GenerationStatus::Pending,
            generated_cards: Vec::new(),
            max_cards,
            created_at: now,
            updated_at: now,
            completed_at: None,
            error_message: None,
        })
    }

    /// Create a pending session targeting `deck`.
    pub fn for_deck(context: &str, deck: &Deck, max_cards: usize) -> Result<Self> {
        Self::new(context, Some(deck.id()), max_cards)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn generated_cards(&self) -> &[Card] {
        &self.generated_cards
    }

    pub fn max_cards(&self) -> usize {
        self.max_cards
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn cards_generated_count(&self) -> usize {
        self.generated_cards.len()
    }

    pub fn is_pending(&self) -> bool {
        self.status == GenerationStatus::Pending
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == GenerationStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == GenerationStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == GenerationStatus::Failed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == GenerationStatus::Cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn can_add_cards(&self) -> bool {
        self.status.accepts_cards() && self.generated_cards.len() < self.max_cards
    }

    pub fn start(&mut self) -> Result<()> {
        self.apply(SessionEvent::Start)
    }

    /// Finish successfully. Requires at least one generated card.
    pub fn complete(&mut self) -> Result<()> {
        if !self.status.is_terminal() && self.generated_cards.is_empty() {
            warn!(session_id = %self.id, "completion refused, no cards generated");
            return Err(DomainError::EmptyCompletion);
        }
        self.apply(SessionEvent::Complete)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.apply(SessionEvent::Fail)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.apply(SessionEvent::Cancel)
    }

    /// Record a generated card, pointing it at the session's deck.
    pub fn add_generated_card(&mut self, mut card: Card) -> Result<()> {
        self.ensure_accepting()?;

        card.assign_to_deck(self.deck_id);
        debug!(session_id = %self.id, card_id = %card.id(), word = card.word().value(), "card generated");
        self.generated_cards.push(card);
        self.touch();
        Ok(())
    }

    /// Add a generated card to both this session and its target deck.
    ///
    /// Fails without touching either side if the deck is not the session's
    /// target, the session refuses cards, or the deck is at its capacity
    /// ceiling under `policy`.
    pub fn submit_to(&mut self, deck: &mut Deck, card: Card, policy: &GenerationPolicy) -> Result<()> {
        if deck.id() != self.deck_id {
            return Err(DomainError::InvalidSession(format!(
                "session targets deck {} but deck {} was given",
                self.deck_id,
                deck.id()
            )));
        }
        self.ensure_accepting()?;
        if !deck.can_add_more_cards_within(1, policy) {
            return Err(DomainError::CapacityExceeded {
                max: deck.capacity(policy),
            });
        }

        deck.add_card(card);
        if let Some(added) = deck.cards().last() {
            debug!(session_id = %self.id, card_id = %added.id(), deck_id = %deck.id(), "card submitted");
            self.generated_cards.push(added.clone());
            self.touch();
        }
        Ok(())
    }

    /// Generated cards whose normalized word equals `word`.
    pub fn get_cards_by_word(&self, word: &str) -> Vec<&Card> {
        let word = word.trim().to_lowercase();
        self.generated_cards
            .iter()
            .filter(|c| c.word().normalized() == word)
            .collect()
    }

    pub fn has_duplicate_word(&self, word: &str) -> bool {
        !self.get_cards_by_word(word).is_empty()
    }

    /// Distinct normalized words, in the order they were first generated.
    pub fn get_unique_words(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.generated_cards
            .iter()
            .map(|c| c.word().normalized())
            .filter(|w| seen.insert(*w))
            .collect()
    }

    fn ensure_accepting(&self) -> Result<()> {
        if !self.status.accepts_cards() {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "add cards to",
            });
        }
        if self.generated_cards.len() >= self.max_cards {
            return Err(DomainError::CapacityExceeded {
                max: self.max_cards,
            });
        }
        Ok(())
    }

    fn apply(&mut self, event: SessionEvent) -> Result<()> {
        let next = match self.status.transition(event) {
            Ok(next) => next,
            Err(error) => {
                warn!(session_id = %self.id, status = %self.status, ?event, "transition refused");
                return Err(error);
            }
        };

        debug!(session_id = %self.id, from = %self.status, to = %next, "session transition");
        let now = Utc::now();
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub(crate) fn validate_context(context: &str) -> Result<String> {
    let context = context.trim();
    if context.is_empty() {
        return Err(DomainError::InvalidSession("context cannot be empty".to_string()));
    }
    Ok(context.to_string())
}

pub(crate) fn validate_deck_id(deck_id: Option<DeckId>) -> Result<DeckId> {
    match deck_id {
        Some(id) if !id.is_nil() => Ok(id),
        _ => Err(DomainError::MissingDeck),
    }
}

pub(crate) fn validate_max_cards(max_cards: usize) -> Result<usize> {
    if !(1..=MAX_CARDS_PER_GENERATION).contains(&max_cards) {
        return Err(DomainError::InvalidSession(format!(
            "max cards must be between 1 and {MAX_CARDS_PER_GENERATION}, got {max_cards}"
        )));
    }
    Ok(max_cards)
}
