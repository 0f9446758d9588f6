use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The independent documents the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Attendance,
    Vocab,
}

impl Namespace {
    /// Stable key under which the document is stored.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Namespace::Attendance => "attendance",
            Namespace::Vocab => "vocab",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Namespaced key -> JSON document store.
///
/// Bodies are opaque strings here; typed decoding and the fallback to
/// defaults live in [`crate::documents`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the raw document body stored under `namespace`.
    ///
    /// Returns `Ok(None)` when nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_document(&self, namespace: Namespace) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn save_document(&self, namespace: Namespace, body: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<HashMap<Namespace, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryRepository {
    async fn load_document(&self, namespace: Namespace) -> Result<Option<String>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&namespace).cloned())
    }

    async fn save_document(&self, namespace: Namespace, body: &str) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(namespace, body.to_owned());
        Ok(())
    }
}

/// Aggregates the document store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub documents: Arc<dyn DocumentStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let documents: Arc<dyn DocumentStore> = Arc::new(InMemoryRepository::new());
        Self { documents }
    }
}
