//! PostgreSQL database operations

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use cardgen_core::{
    Card, CardId, CardRepository, Deck, DeckId, DomainError, GenerationSession,
    GenerationStatus, RepositoryError, RepositoryResult, SessionId,
};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Deck Repository ===

    /// Insert a new deck row. Cards are stored separately.
    pub async fn insert_deck(&self, deck: &Deck) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO decks (id, title, description, max_cards_per_generation, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(deck.id())
        .bind(deck.title())
        .bind(deck.description())
        .bind(deck.max_cards_per_generation() as i32)
        .bind(deck.created_at())
        .bind(deck.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load a deck with all of its cards in insertion order
    pub async fn get_deck(&self, deck_id: DeckId) -> Result<Option<Deck>> {
        let row = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, title, description, max_cards_per_generation, created_at, updated_at
            FROM decks
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let cards = self.cards_for_deck(deck_id).await?;
        let deck = row.into_deck(cards).map_err(|e| corrupt("deck", deck_id, e))?;
        Ok(Some(deck))
    }

    /// List all decks with their card counts
    pub async fn list_decks(&self) -> Result<Vec<DeckSummary>> {
        let decks = sqlx::query_as::<_, DeckSummary>(
            r#"
            SELECT d.id, d.title, d.description, d.max_cards_per_generation,
                   COUNT(c.id) AS card_count, d.created_at, d.updated_at
            FROM decks d
            LEFT JOIN cards c ON c.deck_id = d.id
            GROUP BY d.id
            ORDER BY d.created_at, d.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(decks)
    }

    /// Delete a deck with its cards and sessions. Returns whether it existed.
    pub async fn delete_deck(&self, deck_id: DeckId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM decks WHERE id = $1")
            .bind(deck_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Card Repository ===

    /// Get card by ID
    pub async fn get_card(&self, card_id: CardId) -> Result<Option<Card>> {
        let row = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, deck_id, word, translation, example_original, example_translated,
                   audio_path, context, created_at, updated_at
            FROM cards
            WHERE id = $1
            "#,
        )
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_card().map_err(|e| corrupt("card", card_id, e)))
            .transpose()
    }

    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>> {
        let rows = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, deck_id, word, translation, example_original, example_translated,
                   audio_path, context, created_at, updated_at
            FROM cards
            WHERE deck_id = $1
            ORDER BY seq
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let id = r.id;
                r.into_card().map_err(|e| corrupt("card", id, e))
            })
            .collect()
    }

    // === Session Repository ===

    /// Insert a new session row
    pub async fn insert_session(&self, session: &GenerationSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO generation_sessions
                (id, deck_id, context, status, max_cards, created_at, updated_at, completed_at, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id())
        .bind(session.deck_id())
        .bind(session.context())
        .bind(session.status().as_str())
        .bind(session.max_cards() as i32)
        .bind(session.created_at())
        .bind(session.updated_at())
        .bind(session.completed_at())
        .bind(session.error_message())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist a session's lifecycle fields if the stored status is still
    /// `previous`; another writer moving the session first is a conflict.
    pub async fn update_session_state(
        &self,
        session: &GenerationSession,
        previous: GenerationStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE generation_sessions
            SET status = $2, updated_at = $3, completed_at = $4, error_message = $5
            WHERE id = $1 AND status = $6
            "#,
        )
        .bind(session.id())
        .bind(session.status().as_str())
        .bind(session.updated_at())
        .bind(session.completed_at())
        .bind(session.error_message())
        .bind(previous.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM generation_sessions WHERE id = $1")
                .bind(session.id())
                .fetch_optional(&self.pool)
                .await?;
        match exists {
            Some(_) => Err(ApiError::Conflict(format!(
                "session {} is no longer {}",
                session.id(),
                previous
            ))),
            None => Err(ApiError::NotFound(format!("session {}", session.id()))),
        }
    }

    /// Load a session with its generated cards in order
    pub async fn get_session(&self, session_id: SessionId) -> Result<Option<GenerationSession>> {
        let row = sqlx::query_as::<_, DbSession>(
            r#"
            SELECT id, deck_id, context, status, max_cards, created_at, updated_at,
                   completed_at, error_message
            FROM generation_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_session(row).await?)),
            None => Ok(None),
        }
    }

    /// All sessions that targeted a deck, oldest first
    pub async fn list_sessions_for_deck(&self, deck_id: DeckId) -> Result<Vec<GenerationSession>> {
        let rows = sqlx::query_as::<_, DbSession>(
            r#"
            SELECT id, deck_id, context, status, max_cards, created_at, updated_at,
                   completed_at, error_message
            FROM generation_sessions
            WHERE deck_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(self.hydrate_session(row).await?);
        }
        Ok(sessions)
    }

    async fn hydrate_session(&self, row: DbSession) -> Result<GenerationSession> {
        let cards = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT c.id, c.deck_id, c.word, c.translation, c.example_original,
                   c.example_translated, c.audio_path, c.context, c.created_at, c.updated_at
            FROM session_cards sc
            JOIN cards c ON c.id = sc.card_id
            WHERE sc.session_id = $1
            ORDER BY sc.position
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let cards = cards
            .into_iter()
            .map(|r| {
                let id = r.id;
                r.into_card().map_err(|e| corrupt("card", id, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let session_id = row.id;
        row.into_session(cards)
            .map_err(|e| corrupt("session", session_id, e))
    }

    /// Store a card just submitted through `session` into `deck`.
    ///
    /// The session and deck rows are locked. The stored session status must
    /// match the in-memory one and the stored card counts must match the
    /// in-memory state minus the new card; otherwise this is a conflict.
    pub async fn record_submission(
        &self,
        session: &GenerationSession,
        deck: &Deck,
        card: &Card,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let stored_status: Option<String> =
            sqlx::query_scalar("SELECT status FROM generation_sessions WHERE id = $1 FOR UPDATE")
                .bind(session.id())
                .fetch_optional(&mut *tx)
                .await?;
        let stored_status =
            stored_status.ok_or_else(|| ApiError::NotFound(format!("session {}", session.id())))?;
        if stored_status != session.status().as_str() {
            return Err(ApiError::Conflict(format!(
                "session {} is {} and no longer accepts cards",
                session.id(),
                stored_status
            )));
        }

        let stored_session_cards: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM session_cards WHERE session_id = $1")
                .bind(session.id())
                .fetch_one(&mut *tx)
                .await?;
        let stored_deck_cards = lock_and_count(
            &mut tx,
            "SELECT id FROM decks WHERE id = $1 FOR UPDATE",
            "SELECT COUNT(*) FROM cards WHERE deck_id = $1",
            deck.id(),
        )
        .await?;

        if stored_session_cards + 1 != session.cards_generated_count() as i64
            || stored_deck_cards + 1 != deck.card_count() as i64
        {
            return Err(ApiError::Conflict(format!(
                "session {} changed while the card was being submitted",
                session.id()
            )));
        }

        insert_card(&mut tx, card).await?;

        sqlx::query(
            r#"
            INSERT INTO session_cards (session_id, card_id, position)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(session.id())
        .bind(card.id())
        .bind(stored_session_cards as i32)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE generation_sessions SET updated_at = $2 WHERE id = $1")
            .bind(session.id())
            .bind(session.updated_at())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE decks SET updated_at = $2 WHERE id = $1")
            .bind(deck.id())
            .bind(deck.updated_at())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn lock_and_count(
    tx: &mut Transaction<'_, Postgres>,
    lock_sql: &str,
    count_sql: &str,
    id: Uuid,
) -> Result<i64> {
    let locked = sqlx::query(lock_sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    if locked.is_none() {
        return Err(ApiError::NotFound(id.to_string()));
    }

    let count: i64 = sqlx::query_scalar(count_sql)
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count)
}

async fn insert_card(tx: &mut Transaction<'_, Postgres>, card: &Card) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO cards
            (id, deck_id, word, word_normalized, translation, example_original,
             example_translated, audio_path, context, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(card.id())
    .bind(card.deck_id())
    .bind(card.word().value())
    .bind(card.word().normalized())
    .bind(card.translation().value())
    .bind(card.example().original())
    .bind(card.example().translated())
    .bind(card.audio().map(|a| a.path()))
    .bind(card.context())
    .bind(card.created_at())
    .bind(card.updated_at())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn corrupt(kind: &str, id: Uuid, error: DomainError) -> ApiError {
    ApiError::Internal(format!("stored {kind} {id} is invalid: {error}"))
}

fn repository_error(error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::DuplicateKey(db.message().to_string())
        }
        _ => RepositoryError::Backend(error.to_string()),
    }
}

fn rows_into_cards(rows: Vec<DbCard>) -> RepositoryResult<Vec<Card>> {
    rows.into_iter()
        .map(|r| {
            r.into_card()
                .map_err(|e| RepositoryError::Backend(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl CardRepository for Database {
    async fn find_by_id(&self, id: CardId) -> RepositoryResult<Option<Card>> {
        self.get_card(id)
            .await
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn find_by_word(&self, word: &str) -> RepositoryResult<Vec<Card>> {
        let rows = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, deck_id, word, translation, example_original, example_translated,
                   audio_path, context, created_at, updated_at
            FROM cards
            WHERE word_normalized = $1
            ORDER BY seq
            "#,
        )
        .bind(word.trim().to_lowercase())
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;

        rows_into_cards(rows)
    }

    async fn find_by_deck_id(&self, deck_id: DeckId) -> RepositoryResult<Vec<Card>> {
        self.cards_for_deck(deck_id)
            .await
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Card>> {
        let rows = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, deck_id, word, translation, example_original, example_translated,
                   audio_path, context, created_at, updated_at
            FROM cards
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;

        rows_into_cards(rows)
    }

    async fn save(&self, card: &Card) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await.map_err(repository_error)?;
        insert_card(&mut tx, card).await.map_err(repository_error)?;
        tx.commit().await.map_err(repository_error)
    }

    async fn update(&self, card: &Card) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET deck_id = $2, word = $3, word_normalized = $4, translation = $5,
                example_original = $6, example_translated = $7, audio_path = $8,
                context = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(card.id())
        .bind(card.deck_id())
        .bind(card.word().value())
        .bind(card.word().normalized())
        .bind(card.translation().value())
        .bind(card.example().original())
        .bind(card.example().translated())
        .bind(card.audio().map(|a| a.path()))
        .bind(card.context())
        .bind(card.updated_at())
        .execute(&self.pool)
        .await
        .map_err(repository_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(card.id().to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: CardId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(repository_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
