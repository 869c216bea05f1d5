//! Card generation workflow: sessions feeding cards into decks.

use std::sync::Arc;

use cardgen_core::{
    Card, CardInput, CardQualityService, CardRepository, Deck, DuplicateDetectionService,
    GenerationPolicy, GenerationSession, QualityReport, SessionId,
};
use tracing::info;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{CreateSessionRequest, SubmitCardResponse, UniquenessResponse};

/// Session size for a request, falling back to the policy default.
pub fn resolve_max_cards(requested: Option<usize>, policy: &GenerationPolicy) -> usize {
    requested.unwrap_or(policy.default_max_cards)
}

/// Similarity threshold for a request, falling back to `default`.
pub fn resolve_threshold(requested: Option<f64>, default: f64) -> Result<f64> {
    match requested {
        Some(value) if !(0.0..=1.0).contains(&value) => Err(ApiError::BadRequest(format!(
            "threshold must be between 0 and 1, got {value}"
        ))),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

/// Build a pending session from a request without touching storage.
pub fn open_session(
    request: &CreateSessionRequest,
    policy: &GenerationPolicy,
) -> Result<GenerationSession> {
    let max_cards = resolve_max_cards(request.max_cards, policy);
    Ok(GenerationSession::new(
        &request.context,
        request.deck_id,
        max_cards,
    )?)
}

/// Score a card against the rest of its deck.
pub fn assess_in_deck(card: &Card, deck: &Deck) -> QualityReport {
    let others = deck.cards().iter().filter(|c| c.id() != card.id());
    CardQualityService::new().evaluate_in_context(card, others)
}

/// Check a card against `candidates`, suggesting alternatives when it is not unique.
pub fn check_uniqueness(
    detector: &DuplicateDetectionService,
    card: &Card,
    candidates: &[Card],
) -> UniquenessResponse {
    let others: Vec<Card> = candidates
        .iter()
        .filter(|c| c.id() != card.id())
        .cloned()
        .collect();

    let (unique, problems) = detector.validate_card_uniqueness(card, &others);
    let suggestions = if unique {
        Vec::new()
    } else {
        detector.suggest_alternatives(card.word().value(), &others)
    };

    UniquenessResponse {
        card_id: card.id(),
        unique,
        problems,
        suggestions,
    }
}

/// Validate `input` into a card, submit it through the session into its deck,
/// persist both, then score it and look for duplicates already in the deck.
pub async fn submit_card(
    db: &Arc<Database>,
    policy: &GenerationPolicy,
    session_id: SessionId,
    input: &CardInput,
) -> Result<SubmitCardResponse> {
    let mut session = db
        .get_session(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))?;
    let mut deck = db
        .get_deck(session.deck_id())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deck {}", session.deck_id())))?;

    let card = Card::create(input)?;
    session.submit_to(&mut deck, card, policy)?;

    let card = session
        .generated_cards()
        .last()
        .cloned()
        .ok_or_else(|| ApiError::Internal("submitted card missing from session".to_string()))?;

    db.record_submission(&session, &deck, &card).await?;
    info!(
        session_id = %session.id(),
        deck_id = %deck.id(),
        card_id = %card.id(),
        cards_generated = session.cards_generated_count(),
        "card submitted"
    );

    let quality = assess_in_deck(&card, &deck);
    let repository: Arc<dyn CardRepository> = db.clone();
    let duplicates = DuplicateDetectionService::new(repository)
        .with_policy(policy.clone())
        .find_duplicates_for_card(&card, policy.duplicate_threshold)
        .await?;

    Ok(SubmitCardResponse {
        cards_generated: session.cards_generated_count(),
        can_add_cards: session.can_add_cards(),
        card,
        quality,
        duplicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardgen_core::{DomainError, InMemoryCardRepository, QualityLevel};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn card(word: &str, translation: &str) -> Card {
        Card::create(&CardInput {
            word: word.to_string(),
            translation: translation.to_string(),
            example_original: format!("I used the word {word} at the station."),
            example_translated: format!("Eu usei a palavra {translation} na estação."),
            ..CardInput::default()
        })
        .unwrap()
    }

    fn detector() -> DuplicateDetectionService {
        DuplicateDetectionService::new(Arc::new(InMemoryCardRepository::new()))
    }

    #[test]
    fn test_resolve_max_cards() {
        let policy = GenerationPolicy::default();
        assert_eq!(resolve_max_cards(None, &policy), 10);
        assert_eq!(resolve_max_cards(Some(3), &policy), 3);
    }

    #[test]
    fn test_resolve_threshold() {
        assert_eq!(resolve_threshold(None, 0.8).unwrap(), 0.8);
        assert_eq!(resolve_threshold(Some(0.5), 0.8).unwrap(), 0.5);
        assert!(matches!(
            resolve_threshold(Some(1.2), 0.8),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_open_session() {
        let policy = GenerationPolicy::default();
        let deck_id = Uuid::new_v4();
        let request = CreateSessionRequest {
            deck_id: Some(deck_id),
            context: "train station".to_string(),
            max_cards: None,
        };

        let session = open_session(&request, &policy).unwrap();
        assert_eq!(session.deck_id(), deck_id);
        assert_eq!(session.max_cards(), 10);
        assert!(session.is_pending());
    }

    #[test]
    fn test_open_session_without_deck() {
        let request = CreateSessionRequest {
            deck_id: None,
            context: "train station".to_string(),
            max_cards: Some(5),
        };
        assert!(matches!(
            open_session(&request, &GenerationPolicy::default()),
            Err(ApiError::Domain(DomainError::MissingDeck))
        ));
    }

    #[test]
    fn test_assess_in_deck_uses_other_cards() {
        let mut deck = Deck::new("Station", None, 10).unwrap();
        deck.add_card(card("ticket", "bilhete"));
        deck.add_card(card("ticket", "passagem"));
        let target = deck.cards()[0].clone();

        let report = assess_in_deck(&target, &deck);
        assert_eq!(report.card_id, target.id());
        assert_eq!(report.metric("diversity_score"), Some(0.0));
        assert!((report.overall_score - 0.9).abs() < 1e-9);
        assert_ne!(report.quality_level, QualityLevel::Invalid);
    }

    #[test]
    fn test_check_uniqueness() {
        let existing = vec![card("platform", "plataforma")];
        let candidate = card("Platform", "cais");

        let response = check_uniqueness(&detector(), &candidate, &existing);
        assert!(!response.unique);
        assert_eq!(response.problems.len(), 1);
        assert!(!response.suggestions.is_empty());

        let response = check_uniqueness(&detector(), &candidate, &[candidate.clone()]);
        assert!(response.unique);
        assert!(response.suggestions.is_empty());
    }
}
