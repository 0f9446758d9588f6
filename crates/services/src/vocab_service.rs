use std::sync::Arc;

use tokio::sync::Mutex;

use practice_core::model::{AnswerOutcome, VocabDeck, VocabId};
use storage::documents::{load_deck, save_deck};
use storage::repository::DocumentStore;

use crate::error::VocabServiceError;

/// Import, removal and graduation over the `vocab` document.
#[derive(Clone)]
pub struct VocabService {
    documents: Arc<dyn DocumentStore>,
    seed_starter_deck: bool,
    write_lock: Arc<Mutex<()>>,
}

impl VocabService {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            documents,
            seed_starter_deck: false,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// When enabled, a missing or unreadable deck is replaced by the starter
    /// words (and persisted) instead of an empty deck.
    #[must_use]
    pub fn with_starter_deck(mut self, enabled: bool) -> Self {
        self.seed_starter_deck = enabled;
        self
    }

    /// Current deck in display order.
    ///
    /// # Errors
    ///
    /// Returns `VocabServiceError::Storage` if the backend fails.
    pub async fn deck(&self) -> Result<VocabDeck, VocabServiceError> {
        self.mutate(|deck| (deck.clone(), false)).await
    }

    /// Import `word - meaning` lines, prepending accepted ones as a block.
    ///
    /// Returns how many lines were accepted; malformed lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `VocabServiceError::Storage` if persistence fails.
    pub async fn import_bulk(&self, text: &str) -> Result<usize, VocabServiceError> {
        let added = self
            .mutate(|deck| {
                let added = deck.import_bulk(text);
                (added, added > 0)
            })
            .await?;
        tracing::debug!(added, "bulk import");
        Ok(added)
    }

    /// Delete an entry; `false` when no entry has that id.
    ///
    /// # Errors
    ///
    /// Returns `VocabServiceError::Storage` if persistence fails.
    pub async fn remove_entry(&self, id: &VocabId) -> Result<bool, VocabServiceError> {
        self.mutate(|deck| {
            let removed = deck.remove_entry(id);
            (removed, removed)
        })
        .await
    }

    /// Record a quiz answer for `id`.
    ///
    /// # Errors
    ///
    /// Returns `VocabServiceError::Storage` if persistence fails.
    pub async fn record_answer(
        &self,
        id: &VocabId,
        correct: bool,
    ) -> Result<AnswerOutcome, VocabServiceError> {
        let outcome = self
            .mutate(|deck| {
                let outcome = deck.record_answer(id, correct);
                (outcome, outcome.is_ok())
            })
            .await?;
        if outcome == AnswerOutcome::Graduated {
            tracing::info!(%id, "entry graduated");
        }
        Ok(outcome)
    }

    /// Load under the lock, run `apply`, and save when it reports a change
    /// or when a starter deck was seeded.
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut VocabDeck) -> (T, bool),
    ) -> Result<T, VocabServiceError> {
        let _guard = self.write_lock.lock().await;
        let (mut deck, seeded) = match load_deck(self.documents.as_ref()).await? {
            Some(deck) => (deck, false),
            None if self.seed_starter_deck => (VocabDeck::starter(), true),
            None => (VocabDeck::new(), false),
        };
        let (out, changed) = apply(&mut deck);
        if changed || seeded {
            save_deck(self.documents.as_ref(), &deck).await?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{InMemoryRepository, Namespace};

    fn service() -> (VocabService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (VocabService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn deck_defaults_to_empty_without_writing() {
        let (service, repo) = service();
        assert!(service.deck().await.unwrap().is_empty());
        assert!(repo.load_document(Namespace::Vocab).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_reports_accepted_lines() {
        let (service, _) = service();
        let added = service
            .import_bulk("alpha - first\n\nbeta-second\nbroken\n - nothing")
            .await
            .unwrap();
        assert_eq!(added, 2);

        let deck = service.deck().await.unwrap();
        let pairs: Vec<(&str, &str)> = deck
            .entries()
            .iter()
            .map(|e| (e.word(), e.meaning()))
            .collect();
        assert_eq!(pairs, vec![("alpha", "first"), ("beta", "second")]);
    }

    #[tokio::test]
    async fn empty_import_does_not_write() {
        let (service, repo) = service();
        assert_eq!(service.import_bulk("\n\nno dash\n").await.unwrap(), 0);
        assert!(repo.load_document(Namespace::Vocab).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn starter_deck_is_seeded_once_and_stable() {
        let (service, repo) = service();
        let service = service.with_starter_deck(true);

        let first = service.deck().await.unwrap();
        assert_eq!(first.len(), 3);
        assert!(repo.load_document(Namespace::Vocab).await.unwrap().is_some());

        let second = service.deck().await.unwrap();
        assert_eq!(first, second);

        let id = first.entries()[0].id().clone();
        assert_eq!(
            service.record_answer(&id, true).await.unwrap(),
            AnswerOutcome::Progressed { streak: 1 }
        );
    }

    #[tokio::test]
    async fn corrupt_deck_falls_back_to_empty() {
        let (service, repo) = service();
        repo.save_document(Namespace::Vocab, "{\"oops\":true}")
            .await
            .unwrap();
        assert!(service.deck().await.unwrap().is_empty());
    }
}
