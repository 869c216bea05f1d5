//! Duplicate and near-duplicate detection between cards.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::card::Card;
use crate::config::GenerationPolicy;
use crate::matching::{normalize_text, similarity_ratio};
use crate::repository::{CardRepository, RepositoryResult};

const WORD_SIMILARITY_WEIGHT: f64 = 0.6;
const TRANSLATION_SIMILARITY_WEIGHT: f64 = 0.3;
const EXAMPLE_SIMILARITY_WEIGHT: f64 = 0.1;

const SUGGESTION_SUFFIXES: [&str; 4] = ["ing", "ed", "s", "ly"];
const SUGGESTION_PREFIXES: [&str; 4] = ["un", "re", "pre", "mis"];
const MAX_SUGGESTIONS: usize = 5;
const MIN_HARVESTED_LENGTH: usize = 4;

/// A stored card and how similar it is to the card being checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateMatch {
    pub card: Card,
    pub similarity: f64,
}

/// Finds cards that duplicate or closely resemble others.
pub struct DuplicateDetectionService {
    repository: Arc<dyn CardRepository>,
    policy: GenerationPolicy,
}

impl DuplicateDetectionService {
    pub fn new(repository: Arc<dyn CardRepository>) -> Self {
        Self {
            repository,
            policy: GenerationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Stored cards at least `threshold` similar to `card`, most similar first.
    ///
    /// Candidates come from the card's deck when it has one, otherwise from
    /// every stored card. The card itself is skipped.
    pub async fn find_duplicates_for_card(
        &self,
        card: &Card,
        threshold: f64,
    ) -> RepositoryResult<Vec<DuplicateMatch>> {
        let candidates = match card.deck_id() {
            Some(deck_id) => self.repository.find_by_deck_id(deck_id).await?,
            None => self.repository.find_all().await?,
        };

        let matches = ranked(candidates.into_iter().filter_map(|existing| {
            if existing.id() == card.id() {
                return None;
            }
            let similarity = calculate_similarity(card, &existing);
            (similarity >= threshold).then_some(DuplicateMatch {
                card: existing,
                similarity,
            })
        }));

        debug!(card_id = %card.id(), threshold, found = matches.len(), "duplicate search");
        Ok(matches)
    }

    /// Stored cards whose word is exactly `word` after normalization.
    pub async fn find_exact_duplicates(&self, word: &str) -> RepositoryResult<Vec<Card>> {
        self.repository.find_by_word(word).await
    }

    /// Stored cards whose normalized word is at least `threshold` similar to
    /// `word`, most similar first.
    pub async fn find_similar_words(
        &self,
        word: &str,
        threshold: f64,
    ) -> RepositoryResult<Vec<DuplicateMatch>> {
        let word = word.trim().to_lowercase();
        let cards = self.repository.find_all().await?;

        let matches = ranked(cards.into_iter().filter_map(|card| {
            let similarity = similarity_ratio(&word, card.word().normalized());
            (similarity >= threshold).then_some(DuplicateMatch { card, similarity })
        }));

        debug!(word = %word, threshold, found = matches.len(), "similar word search");
        Ok(matches)
    }

    /// Compare translations after lowercasing, stripping punctuation and
    /// collapsing whitespace.
    pub fn are_translations_similar(&self, a: &str, b: &str, threshold: f64) -> bool {
        similarity_ratio(&normalize_text(a), &normalize_text(b)) >= threshold
    }

    /// Check `card` against `existing` cards.
    ///
    /// Returns whether the card is unique and one problem description per
    /// violation found. An exact word match is reported once per existing
    /// card and skips the remaining checks for that card.
    pub fn validate_card_uniqueness(&self, card: &Card, existing: &[Card]) -> (bool, Vec<String>) {
        let mut problems = Vec::new();

        for other in existing {
            if card.word().normalized() == other.word().normalized() {
                problems.push(format!(
                    "Word '{}' already exists in card {}",
                    card.word().value(),
                    other.id()
                ));
                continue;
            }

            let similarity = calculate_similarity(card, other);
            if similarity > self.policy.uniqueness_similarity {
                problems.push(format!(
                    "Card is very similar (similarity: {similarity:.2}) to card {}",
                    other.id()
                ));
            }

            if self.are_translations_similar(
                card.translation().value(),
                other.translation().value(),
                self.policy.translation_threshold,
            ) {
                problems.push(format!("Translation is very similar to card {}", other.id()));
            }
        }

        (problems.is_empty(), problems)
    }

    /// Up to five alternative words for `word`.
    ///
    /// Single words get affix variants that are not already in use; words
    /// from the example sentences of `existing` cards are mixed in.
    pub fn suggest_alternatives(&self, word: &str, existing: &[Card]) -> Vec<String> {
        let word = word.trim();
        let lowered = word.to_lowercase();
        let known: HashSet<&str> = existing.iter().map(|c| c.word().normalized()).collect();

        let mut variants = Vec::new();
        if word.split_whitespace().count() == 1 {
            for suffix in SUGGESTION_SUFFIXES {
                if !lowered.ends_with(suffix) {
                    variants.push(format!("{word}{suffix}"));
                }
            }
            for prefix in SUGGESTION_PREFIXES {
                if !lowered.starts_with(prefix) {
                    variants.push(format!("{prefix}{word}"));
                }
            }
            variants.retain(|v| !known.contains(v.to_lowercase().as_str()));
        }

        let harvested = existing
            .iter()
            .filter(|c| c.example().word_count_original() > 1)
            .flat_map(|c| c.example().original().split_whitespace())
            .map(|token| token.trim_matches(|ch: char| !ch.is_alphanumeric()))
            .filter(|token| token.chars().count() >= MIN_HARVESTED_LENGTH)
            .filter(|token| token.to_lowercase() != lowered)
            .map(str::to_string);

        let mut seen = HashSet::new();
        interleave(variants.into_iter(), harvested)
            .filter(|s| seen.insert(s.to_lowercase()))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

/// Weighted similarity of two cards in [0, 1]: word 0.6, translation 0.3,
/// example sentence 0.1.
pub fn calculate_similarity(a: &Card, b: &Card) -> f64 {
    let word = similarity_ratio(a.word().normalized(), b.word().normalized());
    let translation = similarity_ratio(a.translation().normalized(), b.translation().normalized());
    let example = similarity_ratio(
        &a.example().original_normalized(),
        &b.example().original_normalized(),
    );

    word * WORD_SIMILARITY_WEIGHT
        + translation * TRANSLATION_SIMILARITY_WEIGHT
        + example * EXAMPLE_SIMILARITY_WEIGHT
}

/// Sort descending by similarity, keeping fetch order for ties.
fn ranked(matches: impl Iterator<Item = DuplicateMatch>) -> Vec<DuplicateMatch> {
    let mut matches: Vec<DuplicateMatch> = matches.collect();
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    matches
}

fn interleave<T>(
    first: impl Iterator<Item = T>,
    second: impl Iterator<Item = T>,
) -> impl Iterator<Item = T> {
    let mut first = first.fuse();
    let mut second = second.fuse();
    let mut take_first = true;

    std::iter::from_fn(move || {
        let next = if take_first {
            first.next().or_else(|| second.next())
        } else {
            second.next().or_else(|| first.next())
        };
        take_first = !take_first;
        next
    })
}
