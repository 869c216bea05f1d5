//! The word or short phrase being learned.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::matching::normalize_whitespace;
use crate::records::WordRecord;

/// A validated word or phrase in the studied language.
///
/// Letters, whitespace and hyphens only. Equality and hashing use the
/// normalized (lowercase) form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WordRecord", into = "WordRecord")]
pub struct Word {
    value: String,
    normalized: String,
}

impl Word {
    /// Validate and normalize a raw word.
    pub fn new(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidValueObject(
                "word cannot be empty".to_string(),
            ));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-')
        {
            return Err(DomainError::InvalidValueObject(format!(
                "word can only contain letters, spaces and hyphens: {trimmed}"
            )));
        }

        let value = normalize_whitespace(trimmed);
        let normalized = value.to_lowercase();
        Ok(Self { value, normalized })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Lowercase form used for comparisons and lookups.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.value.split_whitespace().count()
    }

    pub fn is_single_word(&self) -> bool {
        self.word_count() == 1
    }

    pub fn is_phrase(&self) -> bool {
        self.word_count() > 1
    }

    /// Whether a single word starts with a vowel (a/an article choice).
    pub fn starts_with_vowel(&self) -> bool {
        self.is_single_word()
            && self
                .normalized
                .chars()
                .next()
                .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Word {}

impl Hash for Word {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses() {
        let word = Word::new("  look   up ").unwrap();
        assert_eq!(word.value(), "look up");
        assert_eq!(word.normalized(), "look up");
        assert_eq!(word.word_count(), 2);
        assert!(word.is_phrase());
        assert!(!word.is_single_word());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Word::new("   "),
            Err(DomainError::InvalidValueObject(_))
        ));
        assert!(Word::new("").is_err());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert!(Word::new("hello!").is_err());
        assert!(Word::new("abc123").is_err());
        assert!(Word::new("well-known").is_ok());
    }

    #[test]
    fn test_normalized_is_idempotent() {
        for raw in ["Algorithm", "  Look UP ", "Well-Known", "a"] {
            let word = Word::new(raw).unwrap();
            let again = Word::new(word.normalized()).unwrap();
            assert_eq!(again.normalized(), word.normalized());
        }
    }

    #[test]
    fn test_equality_ignores_case() {
        assert_eq!(Word::new("House").unwrap(), Word::new("house ").unwrap());
        assert_ne!(Word::new("house").unwrap(), Word::new("mouse").unwrap());
    }

    #[test]
    fn test_starts_with_vowel() {
        assert!(Word::new("Apple").unwrap().starts_with_vowel());
        assert!(!Word::new("banana").unwrap().starts_with_vowel());
        assert!(!Word::new("apple pie").unwrap().starts_with_vowel());
    }

    #[test]
    fn test_length() {
        assert_eq!(Word::new(" cat ").unwrap().len(), 3);
    }
}
