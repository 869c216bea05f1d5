//! Card lookup and storage contract, plus an in-memory implementation.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::card::{Card, CardId};
use crate::deck::DeckId;
use crate::error::RepositoryError;

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage for cards. Lookups return cards in insertion order.
#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn find_by_id(&self, id: CardId) -> RepositoryResult<Option<Card>>;

    /// Cards whose normalized word equals the trimmed, lowercased `word`.
    async fn find_by_word(&self, word: &str) -> RepositoryResult<Vec<Card>>;

    async fn find_by_deck_id(&self, deck_id: DeckId) -> RepositoryResult<Vec<Card>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Card>>;

    /// Insert a new card. Fails with `DuplicateKey` if the id is taken.
    async fn save(&self, card: &Card) -> RepositoryResult<()>;

    /// Replace a stored card. Fails with `NotFound` if the id is unknown.
    async fn update(&self, card: &Card) -> RepositoryResult<()>;

    /// Fails with `NotFound` if the id is unknown.
    async fn delete(&self, id: CardId) -> RepositoryResult<()>;
}

/// Thread-safe, process-local card store.
#[derive(Debug, Default)]
pub struct InMemoryCardRepository {
    cards: RwLock<Vec<Card>>,
}

impl InMemoryCardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: RwLock::new(cards.into_iter().collect()),
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Vec<Card>>> {
        self.cards
            .read()
            .map_err(|_| RepositoryError::Backend("card store lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Vec<Card>>> {
        self.cards
            .write()
            .map_err(|_| RepositoryError::Backend("card store lock poisoned".to_string()))
    }

    fn filtered(&self, predicate: impl Fn(&Card) -> bool) -> RepositoryResult<Vec<Card>> {
        Ok(self.read()?.iter().filter(|c| predicate(c)).cloned().collect())
    }
}

#[async_trait]
impl CardRepository for InMemoryCardRepository {
    async fn find_by_id(&self, id: CardId) -> RepositoryResult<Option<Card>> {
        Ok(self.read()?.iter().find(|c| c.id() == id).cloned())
    }

    async fn find_by_word(&self, word: &str) -> RepositoryResult<Vec<Card>> {
        let word = word.trim().to_lowercase();
        self.filtered(|c| c.word().normalized() == word)
    }

    async fn find_by_deck_id(&self, deck_id: DeckId) -> RepositoryResult<Vec<Card>> {
        self.filtered(|c| c.deck_id() == Some(deck_id))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Card>> {
        Ok(self.read()?.clone())
    }

    async fn save(&self, card: &Card) -> RepositoryResult<()> {
        let mut cards = self.write()?;
        if cards.iter().any(|c| c.id() == card.id()) {
            return Err(RepositoryError::DuplicateKey(card.id().to_string()));
        }
        cards.push(card.clone());
        Ok(())
    }

    async fn update(&self, card: &Card) -> RepositoryResult<()> {
        let mut cards = self.write()?;
        let stored = cards
            .iter_mut()
            .find(|c| c.id() == card.id())
            .ok_or_else(|| RepositoryError::NotFound(card.id().to_string()))?;
        *stored = card.clone();
        Ok(())
    }

    async fn delete(&self, id: CardId) -> RepositoryResult<()> {
        let mut cards = self.write()?;
        let index = cards
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        cards.remove(index);
        Ok(())
    }
}
