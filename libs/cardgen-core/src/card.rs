//! The Card entity: one study unit built from a word, its translation and
//! an example sentence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deck::DeckId;
use crate::error::{DomainError, Result};
use crate::records::CardRecord;
use crate::values::{AudioReference, Example, Translation, Word, MIN_EXAMPLE_LENGTH};

/// Card identifier.
pub type CardId = Uuid;

/// Raw card fields as produced by a generator or submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardInput {
    pub word: String,
    pub translation: String,
    pub example_original: String,
    pub example_translated: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
}

/// A flashcard.
///
/// `deck_id` is a plain foreign key; the owning [`Deck`](crate::Deck) holds the
/// card itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CardRecord", into = "CardRecord")]
pub struct Card {
    pub(crate) id: CardId,
    pub(crate) word: Word,
    pub(crate) translation: Translation,
    pub(crate) example: Example,
    pub(crate) audio: Option<AudioReference>,
    pub(crate) context: String,
    pub(crate) deck_id: Option<DeckId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Card {
    /// Create a card from already validated values.
    pub fn new(word: Word, translation: Translation, example: Example) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            word,
            translation,
            example,
            audio: None,
            context: String::new(),
            deck_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate raw fields and create a card.
    ///
    /// Any failing value is reported as [`DomainError::InvalidCard`].
    pub fn create(input: &CardInput) -> Result<Self> {
        let word = Word::new(&input.word).map_err(invalid_card)?;
        let translation = Translation::new(&input.translation).map_err(invalid_card)?;
        let example = Example::new(&input.example_original, &input.example_translated)
            .map_err(invalid_card)?;

        let mut card = Self::new(word, translation, example);
        if let Some(context) = &input.context {
            card.context = context.clone();
        }
        if let Some(path) = &input.audio_path {
            card.audio = Some(AudioReference::new(path).map_err(invalid_card)?);
        }
        Ok(card)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_audio(mut self, audio: AudioReference) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    pub fn example(&self) -> &Example {
        &self.example
    }

    pub fn audio(&self) -> Option<&AudioReference> {
        self.audio.as_ref()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn deck_id(&self) -> Option<DeckId> {
        self.deck_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attach audio, replacing any previous reference.
    pub fn add_audio(&mut self, audio: AudioReference) {
        self.audio = Some(audio);
        self.touch();
    }

    /// Replace the translation. Rejects a translation equal to the current one.
    pub fn update_translation(&mut self, translation: Translation) -> Result<()> {
        if translation.normalized() == self.translation.normalized() {
            return Err(DomainError::InvalidMutation(format!(
                "translation '{}' is unchanged",
                translation.value()
            )));
        }
        self.translation = translation;
        self.touch();
        Ok(())
    }

    pub fn update_example(&mut self, example: Example) -> Result<()> {
        if example.original_normalized().chars().count() < MIN_EXAMPLE_LENGTH {
            return Err(DomainError::InvalidMutation(format!(
                "example must have at least {MIN_EXAMPLE_LENGTH} characters"
            )));
        }
        self.example = example;
        self.touch();
        Ok(())
    }

    pub fn assign_to_deck(&mut self, deck_id: DeckId) {
        self.deck_id = Some(deck_id);
        self.touch();
    }

    /// Cheap exact check: same normalized word and same normalized translation.
    pub fn is_similar_to(&self, other: &Card) -> bool {
        self.word.normalized() == other.word.normalized()
            && self.translation.normalized() == other.translation.normalized()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn invalid_card(error: DomainError) -> DomainError {
    match error {
        DomainError::InvalidValueObject(message) => DomainError::InvalidCard(message),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn input(word: &str, translation: &str) -> CardInput {
        CardInput {
            word: word.to_string(),
            translation: translation.to_string(),
            example_original: format!("The {word} was mentioned twice today."),
            example_translated: format!("O {translation} foi mencionado duas vezes hoje."),
            context: None,
            audio_path: None,
        }
    }

    pub(crate) fn card(word: &str, translation: &str) -> Card {
        Card::create(&input(word, translation)).unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let card = card("house", "casa");
        assert_eq!(card.word().value(), "house");
        assert_eq!(card.context(), "");
        assert_eq!(card.deck_id(), None);
        assert!(card.audio().is_none());
        assert_eq!(card.created_at(), card.updated_at());
    }

    #[test]
    fn test_create_with_context_and_audio() {
        let mut raw = input("house", "casa");
        raw.context = Some("home vocabulary".to_string());
        raw.audio_path = Some("audio/house.mp3".to_string());

        let card = Card::create(&raw).unwrap();
        assert_eq!(card.context(), "home vocabulary");
        assert_eq!(card.audio().unwrap().filename(), "house.mp3");
    }

    #[test]
    fn test_create_rejects_invalid_values() {
        let mut raw = input("house", "casa");
        raw.word = "h0use".to_string();
        assert!(matches!(Card::create(&raw), Err(DomainError::InvalidCard(_))));

        let mut raw = input("house", "casa");
        raw.example_original = "Short".to_string();
        assert!(matches!(Card::create(&raw), Err(DomainError::InvalidCard(_))));

        let mut raw = input("house", "casa");
        raw.audio_path = Some("house.txt".to_string());
        assert!(matches!(Card::create(&raw), Err(DomainError::InvalidCard(_))));
    }

    #[test]
    fn test_add_audio_replaces() {
        let mut card = card("house", "casa");
        card.add_audio(AudioReference::new("a.mp3").unwrap());
        card.add_audio(AudioReference::new("b.wav").unwrap());
        assert_eq!(card.audio().unwrap().path(), "b.wav");
        assert!(card.updated_at() >= card.created_at());
    }

    #[test]
    fn test_update_translation_rejects_same_value() {
        let mut card = card("house", "casa");
        let result = card.update_translation(Translation::new("  CASA ").unwrap());
        assert!(matches!(result, Err(DomainError::InvalidMutation(_))));

        card.update_translation(Translation::new("casa, lar").unwrap())
            .unwrap();
        assert_eq!(card.translation().value(), "casa, lar");
    }

    #[test]
    fn test_update_example() {
        let mut card = card("house", "casa");
        let example = Example::new("My house is blue.", "Minha casa é azul.").unwrap();
        card.update_example(example.clone()).unwrap();
        assert_eq!(card.example(), &example);
    }

    #[test]
    fn test_assign_to_deck_is_idempotent() {
        let mut card = card("house", "casa");
        let deck_id = Uuid::new_v4();
        card.assign_to_deck(deck_id);
        card.assign_to_deck(deck_id);
        assert_eq!(card.deck_id(), Some(deck_id));
    }

    #[test]
    fn test_is_similar_to() {
        let a = card("House", "Casa");
        let b = card("house ", "casa");
        let c = card("house", "lar");
        assert!(a.is_similar_to(&b));
        assert!(!a.is_similar_to(&c));
    }
}
