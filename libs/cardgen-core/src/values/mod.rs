//! Immutable, self-validating building blocks of a card.
//!
//! Every value is built through its validating constructor, so a value that
//! exists is always valid and already normalized.

pub mod audio;
pub mod example;
pub mod translation;
pub mod word;

pub use audio::{AudioReference, SUPPORTED_AUDIO_FORMATS};
pub use example::{Example, MIN_EXAMPLE_LENGTH};
pub use translation::Translation;
pub use word::Word;
