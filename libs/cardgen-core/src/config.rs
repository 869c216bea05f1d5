//! Tunable generation policy.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Upper bound for cards produced by one generation.
pub const MAX_CARDS_PER_GENERATION: usize = 20;

/// Policy constants for decks, sessions and duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPolicy {
    /// Session size used when a caller does not ask for one.
    pub default_max_cards: usize,
    /// A deck holds at most `max_cards_per_generation * deck_capacity_multiplier` cards.
    pub deck_capacity_multiplier: usize,
    pub duplicate_threshold: f64,
    pub similar_word_threshold: f64,
    pub translation_threshold: f64,
    /// Weighted similarity above which a card is reported as not unique.
    pub uniqueness_similarity: f64,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            default_max_cards: 10,
            deck_capacity_multiplier: 10,
            duplicate_threshold: 0.8,
            similar_word_threshold: 0.7,
            translation_threshold: 0.8,
            uniqueness_similarity: 0.9,
        }
    }
}

impl GenerationPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CARDS_PER_GENERATION).contains(&self.default_max_cards) {
            return Err(DomainError::InvalidValueObject(format!(
                "default max cards must be between 1 and {MAX_CARDS_PER_GENERATION}"
            )));
        }
        if self.deck_capacity_multiplier == 0 {
            return Err(DomainError::InvalidValueObject(
                "deck capacity multiplier must be positive".to_string(),
            ));
        }

        let thresholds = [
            ("duplicate_threshold", self.duplicate_threshold),
            ("similar_word_threshold", self.similar_word_threshold),
            ("translation_threshold", self.translation_threshold),
            ("uniqueness_similarity", self.uniqueness_similarity),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidValueObject(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}
