//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helpers for creating decks and sessions through the API
//!
//! # Requirements
//! Tests using [`TestContext::new`] need a PostgreSQL database
//! (set DATABASE_URL env var). [`TestContext::offline`] never connects.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use uuid::Uuid;

use cardgen_backend::db::Database;
use cardgen_backend::{router, AppState};
use cardgen_core::GenerationPolicy;

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context against a real database.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_database(db)
    }

    /// Create a context whose pool never connects.
    ///
    /// Use this for requests rejected before any query runs.
    pub fn offline() -> Self {
        let db = Database::connect_lazy("postgres://localhost/cardgen_offline", 1)
            .expect("Failed to create lazy pool");
        Self::with_database(db)
    }

    fn with_database(db: Database) -> Self {
        let db = Arc::new(db);
        let state = AppState {
            db: db.clone(),
            policy: GenerationPolicy::default(),
        };

        Self {
            db,
            app: router(state),
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Get a test server for the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to create test server")
    }

    /// Create a deck through the API and return its ID.
    pub async fn create_deck(&self, server: &TestServer, max_cards: usize) -> Uuid {
        let response = server
            .post("/api/decks")
            .json(&fixtures::create_deck_request(
                &fixtures::unique_title("deck"),
                max_cards,
            ))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        parse_id(&body)
    }

    /// Open a session through the API and return its ID.
    pub async fn create_session(&self, server: &TestServer, deck_id: Uuid, max_cards: usize) -> Uuid {
        let response = server
            .post("/api/sessions")
            .json(&fixtures::create_session_request(
                Some(deck_id),
                "at the train station",
                max_cards,
            ))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        parse_id(&body)
    }

    /// Remove a deck together with its cards and sessions.
    pub async fn cleanup_deck(&self, deck_id: Uuid) {
        let _ = self.db.delete_deck(deck_id).await;
    }
}

/// Read the `id` field of a JSON response body.
pub fn parse_id(body: &serde_json::Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("response has an id")
}
