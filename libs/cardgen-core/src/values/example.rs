//! Example sentence pair showing a word in use.

use std::fmt;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::matching::normalize_whitespace;
use crate::records::ExampleRecord;

/// Minimum length, in characters, of both sides of an example.
pub const MIN_EXAMPLE_LENGTH: usize = 10;

/// An original sentence and its translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ExampleRecord", into = "ExampleRecord")]
pub struct Example {
    original: String,
    translated: String,
}

impl Example {
    pub fn new(original: &str, translated: &str) -> Result<Self> {
        let original = Self::validate_side(original, "original")?;
        let translated = Self::validate_side(translated, "translated")?;
        Ok(Self {
            original,
            translated,
        })
    }

    fn validate_side(text: &str, side: &str) -> Result<String> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Err(DomainError::InvalidValueObject(format!(
                "{side} example cannot be empty"
            )));
        }
        if text.chars().count() < MIN_EXAMPLE_LENGTH {
            return Err(DomainError::InvalidValueObject(format!(
                "{side} example must have at least {MIN_EXAMPLE_LENGTH} characters"
            )));
        }
        Ok(text)
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn translated(&self) -> &str {
        &self.translated
    }

    pub fn original_normalized(&self) -> String {
        self.original.to_lowercase()
    }

    pub fn translated_normalized(&self) -> String {
        self.translated.to_lowercase()
    }

    pub fn word_count_original(&self) -> usize {
        self.original.split_whitespace().count()
    }

    pub fn word_count_translated(&self) -> usize {
        self.translated.split_whitespace().count()
    }

    pub fn length_original(&self) -> usize {
        self.original.chars().count()
    }

    pub fn length_translated(&self) -> usize {
        self.translated.chars().count()
    }

    /// Case-insensitive substring check against the original sentence.
    pub fn contains_word(&self, word: &str) -> bool {
        self.original_normalized().contains(&word.to_lowercase())
    }

    /// Wrap every case-insensitive occurrence of `word` in the markers.
    pub fn highlight_word(&self, word: &str, start: &str, end: &str) -> String {
        if word.is_empty() {
            return self.original.clone();
        }

        match RegexBuilder::new(&regex::escape(word))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern
                .replace_all(&self.original, |caps: &regex::Captures| {
                    format!("{start}{}{end}", &caps[0])
                })
                .into_owned(),
            Err(_) => self.original.clone(),
        }
    }

    /// Highlight `word` in bold markdown.
    pub fn highlight(&self, word: &str) -> String {
        self.highlight_word(word, "**", "**")
    }
}

impl PartialEq for Example {
    fn eq(&self, other: &Self) -> bool {
        self.original_normalized() == other.original_normalized()
            && self.translated_normalized() == other.translated_normalized()
    }
}

impl Eq for Example {}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.original, self.translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_length() {
        assert!(matches!(
            Example::new("Hi", "Olá, tudo bem?"),
            Err(DomainError::InvalidValueObject(_))
        ));
        assert!(Example::new("I go to school.", "Eu vou para a escola.").is_ok());
        assert!(Example::new("I go to school.", "Eu vou").is_err());
    }

    #[test]
    fn test_length_counts_after_collapse() {
        // 9 characters once the inner whitespace is collapsed
        assert!(Example::new("abcd     efgh", "long enough text").is_err());
    }

    #[test]
    fn test_rejects_empty_sides() {
        assert!(Example::new("   ", "Eu vou para a escola.").is_err());
        assert!(Example::new("I go to school.", "").is_err());
    }

    #[test]
    fn test_derived_values() {
        let example = Example::new("  I  go to   school. ", "Eu vou para a escola.").unwrap();
        assert_eq!(example.original(), "I go to school.");
        assert_eq!(example.original_normalized(), "i go to school.");
        assert_eq!(example.word_count_original(), 4);
        assert_eq!(example.word_count_translated(), 5);
        assert_eq!(example.length_original(), 15);
        assert!(example.contains_word("SCHOOL"));
        assert!(!example.contains_word("work"));
    }

    #[test]
    fn test_highlight_is_case_insensitive() {
        let example = Example::new("Run fast, run far.", "Corra rápido, corra longe.").unwrap();
        assert_eq!(example.highlight("run"), "**Run** fast, **run** far.");
        assert_eq!(
            example.highlight_word("far", "<b>", "</b>"),
            "Run fast, run <b>far</b>."
        );
    }

    #[test]
    fn test_highlight_escapes_pattern() {
        let example = Example::new("Is it (really) true?", "É (mesmo) verdade?").unwrap();
        assert_eq!(example.highlight("(really)"), "Is it **(really)** true?");
    }
}
