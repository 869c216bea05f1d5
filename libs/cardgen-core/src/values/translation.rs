//! Translation of a word, possibly listing several alternatives.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::matching::normalize_whitespace;
use crate::records::TranslationRecord;

/// A validated translation. Alternatives are separated by commas,
/// e.g. `"big, large, huge"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TranslationRecord", into = "TranslationRecord")]
pub struct Translation {
    value: String,
    normalized: String,
}

impl Translation {
    pub fn new(value: &str) -> Result<Self> {
        let value = normalize_whitespace(value);
        if value.is_empty() {
            return Err(DomainError::InvalidValueObject(
                "translation cannot be empty".to_string(),
            ));
        }

        let normalized = value.to_lowercase();
        Ok(Self { value, normalized })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Individual translations in order, trimmed, empty entries dropped.
    pub fn translations(&self) -> Vec<&str> {
        self.value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// First listed translation.
    pub fn primary(&self) -> &str {
        self.translations().first().copied().unwrap_or(self.value.as_str())
    }

    /// Every translation after the primary one.
    pub fn alternatives(&self) -> Vec<&str> {
        self.translations().into_iter().skip(1).collect()
    }

    pub fn has_alternatives(&self) -> bool {
        self.translation_count() > 1
    }

    pub fn translation_count(&self) -> usize {
        self.translations().len()
    }

    /// Case-insensitive substring search over the individual translations.
    pub fn contains_translation(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.translations()
            .iter()
            .any(|t| t.to_lowercase().contains(&term))
    }
}

impl PartialEq for Translation {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Translation {}

impl Hash for Translation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
