//! The Deck entity: an ordered collection of cards.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::{Card, CardId};
use crate::config::{GenerationPolicy, MAX_CARDS_PER_GENERATION};
use crate::error::{DomainError, Result};
use crate::records::DeckRecord;

/// Deck identifier.
pub type DeckId = Uuid;

/// A titled, ordered collection of owned cards.
///
/// The deck does not forbid duplicate words; it keeps a count of normalized
/// words so membership checks stay O(1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DeckRecord", into = "DeckRecord")]
pub struct Deck {
    pub(crate) id: DeckId,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) cards: Vec<Card>,
    pub(crate) max_cards_per_generation: usize,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) word_counts: HashMap<String, usize>,
}

impl Deck {
    pub fn new(
        title: &str,
        description: Option<&str>,
        max_cards_per_generation: usize,
    ) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: validate_title(title)?,
            description: description.unwrap_or_default().to_string(),
            cards: Vec::new(),
            max_cards_per_generation: validate_capacity(max_cards_per_generation)?,
            created_at: now,
            updated_at: now,
            word_counts: HashMap::new(),
        })
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn max_cards_per_generation(&self) -> usize {
        self.max_cards_per_generation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn has_cards(&self) -> bool {
        !self.cards.is_empty()
    }

    /// Normalized words present in the deck.
    pub fn unique_words(&self) -> HashSet<&str> {
        self.word_counts.keys().map(String::as_str).collect()
    }

    /// Non-empty contexts that produced cards in this deck.
    pub fn contexts_used(&self) -> HashSet<&str> {
        self.cards
            .iter()
            .map(Card::context)
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Take ownership of a card and point its `deck_id` here.
    pub fn add_card(&mut self, mut card: Card) {
        card.assign_to_deck(self.id);
        *self
            .word_counts
            .entry(card.word().normalized().to_string())
            .or_insert(0) += 1;
        self.cards.push(card);
        self.touch();
    }

    pub fn add_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        for card in cards {
            self.add_card(card);
        }
    }

    /// Remove the first card with `card_id`. Returns whether one was found.
    pub fn remove_card(&mut self, card_id: CardId) -> bool {
        let Some(index) = self.cards.iter().position(|c| c.id() == card_id) else {
            return false;
        };

        let card = self.cards.remove(index);
        let word = card.word().normalized();
        if let Some(count) = self.word_counts.get_mut(word) {
            *count -= 1;
            if *count == 0 {
                self.word_counts.remove(word);
            }
        }
        self.touch();
        true
    }

    pub fn get_card_by_id(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == card_id)
    }

    /// Cards whose context matches exactly.
    pub fn get_cards_by_context(&self, context: &str) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.context() == context).collect()
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.word_counts.contains_key(&normalize_lookup(word))
    }

    /// First card whose normalized word equals `word`.
    pub fn find_similar_card(&self, word: &str) -> Option<&Card> {
        let word = normalize_lookup(word);
        self.cards.iter().find(|c| c.word().normalized() == word)
    }

    /// Whether `count` more cards fit under the default policy ceiling.
    pub fn can_add_more_cards(&self, count: usize) -> bool {
        self.can_add_more_cards_within(count, &GenerationPolicy::default())
    }

    /// Whether `count` more cards fit under
    /// `max_cards_per_generation * policy.deck_capacity_multiplier`.
    pub fn can_add_more_cards_within(&self, count: usize, policy: &GenerationPolicy) -> bool {
        count <= self.capacity(policy).saturating_sub(self.card_count())
    }

    /// Capacity ceiling, saturating at `usize::MAX`.
    pub fn capacity(&self, policy: &GenerationPolicy) -> usize {
        self.max_cards_per_generation
            .saturating_mul(policy.deck_capacity_multiplier)
    }

    /// Cards chunked into generation-sized batches, in order.
    pub fn get_generation_batches(&self) -> Vec<&[Card]> {
        self.cards.chunks(self.max_cards_per_generation).collect()
    }

    pub fn update_title(&mut self, title: &str) -> Result<()> {
        self.title = validate_title(title)?;
        self.touch();
        Ok(())
    }

    pub fn update_description(&mut self, description: Option<&str>) {
        self.description = description.unwrap_or_default().to_string();
        self.touch();
    }

    pub fn clear_cards(&mut self) {
        self.cards.clear();
        self.word_counts.clear();
        self.touch();
    }

    pub(crate) fn rebuild_word_index(&mut self) {
        self.word_counts.clear();
        for card in &self.cards {
            *self
                .word_counts
                .entry(card.word().normalized().to_string())
                .or_insert(0) += 1;
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl PartialEq for Deck {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.cards == other.cards
            && self.max_cards_per_generation == other.max_cards_per_generation
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
    }
}

pub(crate) fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::InvalidDeck("deck title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

pub(crate) fn validate_capacity(max_cards: usize) -> Result<usize> {
    if !(1..=MAX_CARDS_PER_GENERATION).contains(&max_cards) {
        return Err(DomainError::InvalidDeck(format!(
            "max cards per generation must be between 1 and {MAX_CARDS_PER_GENERATION}, got {max_cards}"
        )));
    }
    Ok(max_cards)
}

fn normalize_lookup(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::tests::card;
    use pretty_assertions::assert_eq;

    fn deck(max_cards: usize) -> Deck {
        Deck::new("  Travel  ", None, max_cards).unwrap()
    }

    #[test]
    fn test_new_validates() {
        let deck = deck(10);
        assert_eq!(deck.title(), "Travel");
        assert_eq!(deck.description(), "");
        assert!(deck.is_empty());

        assert!(matches!(
            Deck::new("   ", None, 10),
            Err(DomainError::InvalidDeck(_))
        ));
        assert!(Deck::new("Travel", None, 0).is_err());
        assert!(Deck::new("Travel", None, 21).is_err());
        assert!(Deck::new("Travel", Some("words"), 20).is_ok());
    }

    #[test]
    fn test_add_card_assigns_deck() {
        let mut deck = deck(10);
        deck.add_card(card("airport", "aeroporto"));

        assert_eq!(deck.card_count(), 1);
        assert_eq!(deck.cards()[0].deck_id(), Some(deck.id()));
        assert!(deck.has_word("  AIRPORT "));
        assert!(!deck.has_word("hotel"));
    }

    #[test]
    fn test_duplicates_allowed_and_tracked() {
        let mut deck = deck(10);
        let first = card("airport", "aeroporto");
        let first_id = first.id();
        deck.add_cards(vec![first, card("Airport", "aeroporto")]);

        assert_eq!(deck.card_count(), 2);
        assert_eq!(deck.unique_words().len(), 1);

        assert!(deck.remove_card(first_id));
        assert!(deck.has_word("airport"));
        assert!(!deck.remove_card(first_id));
    }

    #[test]
    fn test_remove_last_occurrence_clears_word() {
        let mut deck = deck(10);
        let card = card("hotel", "hotel");
        let id = card.id();
        deck.add_card(card);
        assert!(deck.remove_card(id));
        assert!(!deck.has_word("hotel"));
        assert!(deck.get_card_by_id(id).is_none());
    }

    #[test]
    fn test_lookup_by_context_and_word() {
        let mut deck = deck(10);
        deck.add_card(card("ticket", "bilhete").with_context("airport"));
        deck.add_card(card("gate", "portão").with_context("airport"));
        deck.add_card(card("room", "quarto").with_context("hotel"));
        deck.add_card(card("key", "chave"));

        assert_eq!(deck.get_cards_by_context("airport").len(), 2);
        assert_eq!(deck.contexts_used().len(), 2);
        assert_eq!(
            deck.find_similar_card("GATE").map(|c| c.translation().value()),
            Some("portão")
        );
        assert!(deck.find_similar_card("door").is_none());
    }

    #[test]
    fn test_capacity() {
        let mut deck = deck(1);
        for word in ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine"] {
            deck.add_card(card(word, "numero"));
        }
        assert!(deck.can_add_more_cards(1));
        assert!(!deck.can_add_more_cards(2));

        let policy = GenerationPolicy {
            deck_capacity_multiplier: 20,
            ..GenerationPolicy::default()
        };
        assert!(deck.can_add_more_cards_within(11, &policy));
    }

    #[test]
    fn test_capacity_does_not_overflow() {
        let mut deck = deck(20);
        deck.add_card(card("one", "um"));
        assert!(!deck.can_add_more_cards(usize::MAX));

        let policy = GenerationPolicy {
            deck_capacity_multiplier: usize::MAX / 2,
            ..GenerationPolicy::default()
        };
        assert!(policy.validate().is_ok());
        assert_eq!(deck.capacity(&policy), usize::MAX);
        assert!(deck.can_add_more_cards_within(1, &policy));
        assert!(!deck.can_add_more_cards_within(usize::MAX, &policy));
    }

    #[test]
    fn test_generation_batches() {
        let mut deck = deck(2);
        for word in ["one", "two", "three", "four", "five"] {
            deck.add_card(card(word, "numero"));
        }

        let batches = deck.get_generation_batches();
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(batches[2][0].word().value(), "five");
    }

    #[test]
    fn test_updates() {
        let mut deck = deck(10);
        deck.update_title(" Hotel ").unwrap();
        assert_eq!(deck.title(), "Hotel");
        assert!(deck.update_title("").is_err());
        assert_eq!(deck.title(), "Hotel");

        deck.update_description(Some("check-in words"));
        assert_eq!(deck.description(), "check-in words");
        deck.update_description(None);
        assert_eq!(deck.description(), "");
    }

    #[test]
    fn test_clear_cards() {
        let mut deck = deck(10);
        deck.add_card(card("hotel", "hotel"));
        deck.clear_cards();
        assert!(deck.is_empty());
        assert!(deck.unique_words().is_empty());
    }
}
