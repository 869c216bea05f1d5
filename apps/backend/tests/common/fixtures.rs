//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// Create a deck request body.
pub fn create_deck_request(title: &str, max_cards: usize) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Integration test deck",
        "max_cards_per_generation": max_cards
    })
}

/// Create a session request body.
pub fn create_session_request(
    deck_id: Option<Uuid>,
    context: &str,
    max_cards: usize,
) -> serde_json::Value {
    json!({
        "deck_id": deck_id,
        "context": context,
        "max_cards": max_cards
    })
}

/// Create a card submission body with a generated example sentence.
pub fn card_input(word: &str, translation: &str) -> serde_json::Value {
    json!({
        "word": word,
        "translation": translation,
        "example_original": format!("We talked about the {word} at the station."),
        "example_translated": format!("Falamos sobre o {translation} na estação."),
        "context": "at the train station"
    })
}

/// Create a fail session request body.
pub fn fail_request(message: &str) -> serde_json::Value {
    json!({ "message": message })
}

/// Generate a unique deck title to avoid collisions.
pub fn unique_title(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}
