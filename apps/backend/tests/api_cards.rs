//! Card lookup and duplicate detection API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use uuid::Uuid;

use common::fixtures;
use common::TestContext;

/// Submit cards into a fresh deck and return the deck and card IDs.
async fn seed_deck(
    ctx: &TestContext,
    server: &TestServer,
    cards: &[(&str, &str)],
) -> (Uuid, Vec<Uuid>) {
    let deck_id = ctx.create_deck(server, 10).await;
    let session_id = ctx.create_session(server, deck_id, cards.len()).await;

    server
        .post(&format!("/api/sessions/{}/start", session_id))
        .await
        .assert_status_ok();

    let mut card_ids = Vec::new();
    for (word, translation) in cards {
        let body: serde_json::Value = server
            .post(&format!("/api/sessions/{}/cards", session_id))
            .json(&fixtures::card_input(word, translation))
            .await
            .json();
        card_ids.push(common::parse_id(&body["card"]));
    }

    (deck_id, card_ids)
}

/// Test fetching a stored card.
#[tokio::test]
#[ignore = "requires database"]
async fn test_get_card() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (deck_id, card_ids) = seed_deck(&ctx, &server, &[("ticket", "bilhete")]).await;

    let response = server.get(&format!("/api/cards/{}", card_ids[0])).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["word"]["value"], "ticket");
    assert_eq!(body["translation"]["value"], "bilhete");
    assert_eq!(body["context"], "at the train station");

    // Cleanup
    ctx.cleanup_deck(deck_id).await;
}

/// Test fetching a missing card.
#[tokio::test]
#[ignore = "requires database"]
async fn test_get_card_not_found() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get(&format!("/api/cards/{}", Uuid::new_v4())).await;

    response.assert_status(StatusCode::NOT_FOUND);
}

/// Test duplicates are found within the card's deck.
#[tokio::test]
#[ignore = "requires database"]
async fn test_card_duplicates() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (deck_id, card_ids) = seed_deck(
        &ctx,
        &server,
        &[("ticket", "bilhete"), ("tickets", "bilhetes"), ("luggage", "bagagem")],
    )
    .await;

    let response = server
        .get(&format!("/api/cards/{}/duplicates", card_ids[0]))
        .add_query_param("threshold", 0.7)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["card"]["id"], card_ids[1].to_string());
    assert!(matches[0]["similarity"].as_f64().unwrap() >= 0.7);

    // Cleanup
    ctx.cleanup_deck(deck_id).await;
}

/// Test uniqueness check flags a repeated word and offers alternatives.
#[tokio::test]
#[ignore = "requires database"]
async fn test_card_uniqueness() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (deck_id, card_ids) =
        seed_deck(&ctx, &server, &[("ticket", "bilhete"), ("Ticket", "passagem")]).await;

    let response = server
        .post(&format!("/api/cards/{}/uniqueness", card_ids[1]))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["unique"], false);
    assert!(!body["problems"].as_array().unwrap().is_empty());
    assert!(!body["suggestions"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_deck(deck_id).await;
}

/// Test a distinct card passes the uniqueness check.
#[tokio::test]
#[ignore = "requires database"]
async fn test_card_uniqueness_distinct() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (deck_id, card_ids) =
        seed_deck(&ctx, &server, &[("ticket", "bilhete"), ("luggage", "bagagem")]).await;

    let response = server
        .post(&format!("/api/cards/{}/uniqueness", card_ids[1]))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["unique"], true);
    assert!(body["suggestions"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_deck(deck_id).await;
}

/// Test similar word search spans every deck.
#[tokio::test]
#[ignore = "requires database"]
async fn test_similar_words() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let word = "zephyrine".to_string();
    let (deck_id, _) = seed_deck(&ctx, &server, &[(word.as_str(), "brisa")]).await;

    let response = server
        .get("/api/words/similar")
        .add_query_param("word", "zephyrin")
        .add_query_param("threshold", 0.9)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let matches = body["matches"].as_array().unwrap();
    assert!(matches
        .iter()
        .any(|m| m["card"]["word"]["value"] == word.as_str()));

    // Cleanup
    ctx.cleanup_deck(deck_id).await;
}
