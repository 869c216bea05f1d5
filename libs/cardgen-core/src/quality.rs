//! Card quality scoring.
//!
//! Each card gets four sub-scores that start at 1.0 and lose fixed amounts
//! for specific defects:
//!
//! | metric              | weight |
//! |---------------------|--------|
//! | `word_score`        | 0.2    |
//! | `translation_score` | 0.3    |
//! | `example_score`     | 0.4    |
//! | `diversity_score`   | 0.1    |
//!
//! The weighted sum and the number of issues found decide the [`QualityLevel`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::{Card, CardId};

const MIN_WORD_LENGTH: usize = 3;
const MAX_WORD_LENGTH: usize = 50;
const MAX_WORD_TOKENS: usize = 5;
const MIN_TRANSLATION_LENGTH: usize = 2;
const MAX_TRANSLATION_LENGTH: usize = 100;
const MIN_EXAMPLE_LENGTH: usize = 10;
const MAX_EXAMPLE_LENGTH: usize = 200;

const WORD_WEIGHT: f64 = 0.2;
const TRANSLATION_WEIGHT: f64 = 0.3;
const EXAMPLE_WEIGHT: f64 = 0.4;
const DIVERSITY_WEIGHT: f64 = 0.1;

const STOP_WORDS: [&str; 12] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];
const GENERIC_TRANSLATIONS: [&str; 5] = ["coisa", "algo", "item", "objeto", "elemento"];
const GENERIC_OPENERS: [&str; 5] = ["this is a", "that is a", "it is a", "here is a", "there is a"];

pub const WORD_SCORE: &str = "word_score";
pub const TRANSLATION_SCORE: &str = "translation_score";
pub const EXAMPLE_SCORE: &str = "example_score";
pub const DIVERSITY_SCORE: &str = "diversity_score";

/// Quality tier, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Invalid,
}

impl QualityLevel {
    pub const ALL: [QualityLevel; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Fair,
        Self::Poor,
        Self::Invalid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Invalid => "invalid",
        }
    }

    /// First matching tier wins.
    fn assign(score: f64, issue_count: usize) -> Self {
        if score >= 0.9 && issue_count == 0 {
            Self::Excellent
        } else if score >= 0.8 && issue_count <= 1 {
            Self::Good
        } else if score >= 0.6 && issue_count <= 3 {
            Self::Fair
        } else if score >= 0.4 {
            Self::Poor
        } else {
            Self::Invalid
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub card_id: CardId,
    pub overall_score: f64,
    pub quality_level: QualityLevel,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub metrics: BTreeMap<String, f64>,
}

impl QualityReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Aggregate over a set of reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityStatistics {
    pub total_cards: usize,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Every tier is present, zero when unused.
    pub quality_distribution: BTreeMap<QualityLevel, usize>,
    pub cards_with_issues: usize,
    pub average_issues_per_card: f64,
}

/// Sub-score with the findings that produced it.
#[derive(Default)]
struct Assessment {
    score: f64,
    issues: Vec<String>,
    suggestions: Vec<String>,
}

impl Assessment {
    fn new() -> Self {
        Self {
            score: 1.0,
            ..Default::default()
        }
    }

    fn deduct(&mut self, amount: f64, issue: String) {
        self.score -= amount;
        self.issues.push(issue);
    }

    fn suggest(&mut self, suggestion: &str) {
        self.suggestions.push(suggestion.to_string());
    }

    fn clamped(mut self) -> Self {
        self.score = self.score.clamp(0.0, 1.0);
        self
    }
}

/// Stateless card evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardQualityService;

impl CardQualityService {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a card on its own. Diversity scores 1.0.
    pub fn evaluate(&self, card: &Card) -> QualityReport {
        self.evaluate_in_context(card, std::iter::empty())
    }

    /// Evaluate a card against `context` cards for the diversity metric.
    pub fn evaluate_in_context<'a>(
        &self,
        card: &Card,
        context: impl IntoIterator<Item = &'a Card>,
    ) -> QualityReport {
        let context: Vec<&Card> = context.into_iter().collect();

        let word = evaluate_word(card.word().value());
        let translation = evaluate_translation(card.translation().value());
        let example = evaluate_example(card.example().original(), card.example().translated());
        let diversity = evaluate_diversity(card, &context);

        let overall_score = word.score * WORD_WEIGHT
            + translation.score * TRANSLATION_WEIGHT
            + example.score * EXAMPLE_WEIGHT
            + diversity * DIVERSITY_WEIGHT;

        let metrics = BTreeMap::from([
            (WORD_SCORE.to_string(), word.score),
            (TRANSLATION_SCORE.to_string(), translation.score),
            (EXAMPLE_SCORE.to_string(), example.score),
            (DIVERSITY_SCORE.to_string(), diversity),
        ]);

        let mut issues = Vec::new();
        let mut suggestions = Vec::new();
        for part in [word, translation, example] {
            issues.extend(part.issues);
            suggestions.extend(part.suggestions);
        }

        let quality_level = QualityLevel::assign(overall_score, issues.len());
        debug!(card_id = %card.id(), overall_score, %quality_level, issues = issues.len(), "card evaluated");

        QualityReport {
            card_id: card.id(),
            overall_score,
            quality_level,
            issues,
            suggestions,
            metrics,
        }
    }

    /// Evaluate every card using all the other cards as its context.
    pub fn batch_evaluate(&self, cards: &[Card]) -> Vec<QualityReport> {
        cards
            .iter()
            .enumerate()
            .map(|(i, card)| {
                let others = cards
                    .iter()
                    .enumerate()
                    .filter(move |(j, _)| *j != i)
                    .map(|(_, other)| other);
                self.evaluate_in_context(card, others)
            })
            .collect()
    }

    /// Aggregate statistics. `None` for an empty set of reports.
    pub fn get_quality_statistics(&self, reports: &[QualityReport]) -> Option<QualityStatistics> {
        if reports.is_empty() {
            return None;
        }

        let total_cards = reports.len();
        let scores = reports.iter().map(|r| r.overall_score);
        let min_score = scores.clone().fold(f64::INFINITY, f64::min);
        let max_score = scores.clone().fold(f64::NEG_INFINITY, f64::max);
        let average_score = scores.sum::<f64>() / total_cards as f64;

        let mut quality_distribution: BTreeMap<QualityLevel, usize> =
            QualityLevel::ALL.iter().map(|level| (*level, 0)).collect();
        for report in reports {
            *quality_distribution.entry(report.quality_level).or_insert(0) += 1;
        }

        let total_issues: usize = reports.iter().map(|r| r.issues.len()).sum();

        Some(QualityStatistics {
            total_cards,
            average_score,
            min_score,
            max_score,
            quality_distribution,
            cards_with_issues: reports.iter().filter(|r| r.has_issues()).count(),
            average_issues_per_card: total_issues as f64 / total_cards as f64,
        })
    }
}

fn evaluate_word(word: &str) -> Assessment {
    let mut result = Assessment::new();
    let length = word.chars().count();

    if length < MIN_WORD_LENGTH {
        result.deduct(0.3, format!("Word is too short ({length} characters)"));
    } else if length > MAX_WORD_LENGTH {
        result.deduct(0.2, format!("Word is too long ({length} characters)"));
    }

    if !is_alphabetic_ignoring(word, &[' ']) {
        result.deduct(0.4, "Word contains invalid characters".to_string());
    }

    if STOP_WORDS.contains(&word.to_lowercase().as_str()) {
        result.deduct(0.2, "Word is too common, consider something more specific".to_string());
        result.suggest("Use more specific words that are useful for learning");
    }

    if word.split_whitespace().count() > MAX_WORD_TOKENS {
        result.deduct(0.3, "Phrase is too long, consider a single word or a shorter phrase".to_string());
        result.suggest("Keep the focus on a single word or a short phrase");
    }

    result.clamped()
}

fn evaluate_translation(translation: &str) -> Assessment {
    let mut result = Assessment::new();
    let length = translation.chars().count();

    if length < MIN_TRANSLATION_LENGTH {
        result.deduct(0.4, format!("Translation is too short ({length} characters)"));
    } else if length > MAX_TRANSLATION_LENGTH {
        result.deduct(0.2, format!("Translation is too long ({length} characters)"));
    }

    if !is_alphabetic_ignoring(translation, &[' ', ',', ';', '(', ')']) {
        result.deduct(0.3, "Translation contains invalid characters".to_string());
    }

    if translation.contains([',', ';']) {
        result.score += 0.1;
        result.suggest("Multiple translations make the card more valuable");
    }

    let lowered = translation.to_lowercase();
    let generic = lowered
        .split(|c: char| !c.is_alphabetic())
        .any(|token| GENERIC_TRANSLATIONS.contains(&token));
    if generic {
        result.deduct(0.2, "Translation is too generic".to_string());
        result.suggest("Use more specific and precise translations");
    }

    result.clamped()
}

fn evaluate_example(original: &str, translated: &str) -> Assessment {
    let mut result = Assessment::new();
    let original_length = original.chars().count();
    let translated_length = translated.chars().count();

    if original_length < MIN_EXAMPLE_LENGTH {
        result.deduct(0.4, format!("Example is too short ({original_length} characters)"));
    } else if original_length > MAX_EXAMPLE_LENGTH {
        result.deduct(0.2, format!("Example is too long ({original_length} characters)"));
    }

    if translated_length < MIN_EXAMPLE_LENGTH {
        result.deduct(
            0.3,
            format!("Example translation is too short ({translated_length} characters)"),
        );
    }

    let lowered = original.to_lowercase();
    if GENERIC_OPENERS.iter().any(|opener| lowered.contains(opener)) {
        result.deduct(0.3, "Example is too generic".to_string());
        result.suggest("Use more specific, contextual examples");
    }

    if original.split_whitespace().next().is_some() {
        result.score += 0.1;
    }

    result.clamped()
}

fn evaluate_diversity(card: &Card, context: &[&Card]) -> f64 {
    if context.is_empty() {
        return 1.0;
    }

    let similar = context
        .iter()
        .filter(|other| {
            other.word().normalized() == card.word().normalized()
                || other.translation().normalized() == card.translation().normalized()
        })
        .count();

    (1.0 - similar as f64 / context.len() as f64).clamp(0.0, 1.0)
}

/// True when `text` has at least one character and all characters outside
/// `allowed` are alphabetic.
fn is_alphabetic_ignoring(text: &str, allowed: &[char]) -> bool {
    let mut rest = text.chars().filter(|c| !allowed.contains(c)).peekable();
    rest.peek().is_some() && rest.all(char::is_alphabetic)
}
