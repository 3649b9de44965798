//! Artist document store
//!
//! Handlers talk to persistence only through the [`ArtistStore`] trait, which
//! mirrors the operations of a document database: find by id, find all,
//! insert many, find-and-update, find-and-delete. Every operation moves whole
//! artist documents; albums and songs are never stored on their own.
//!
//! # Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        API handlers                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ArtistStore trait                        │
//! └─────────────────────────────────────────────────────────────┘
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Memory      │ │     SQLite      │ │   Unavailable   │
//! │  (Vec + RwLock) │ │ (JSON documents)│ │ (startup error) │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::models::{Artist, ArtistDraft, ArtistId};

pub use memory::MemoryArtistStore;
pub use sqlite::SqliteArtistStore;

// ============================================================================
// Errors
// ============================================================================

/// Failures raised by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Document could not be encoded or decoded
    #[error("Document encoding error: {0}")]
    Document(#[from] serde_json::Error),

    /// Filesystem error while opening the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row does not hold a valid artist document
    #[error("Corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// No store could be opened at startup
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// The blocking worker running the operation failed
    #[error("Store task failed: {0}")]
    Task(String),

    /// A previous operation panicked while holding the store lock
    #[error("Store lock poisoned")]
    Poisoned,
}

// ============================================================================
// Store Trait
// ============================================================================

/// Document-store operations over artist documents
#[async_trait]
pub trait ArtistStore: Send + Sync {
    /// Short backend name, reported by the health endpoint
    fn backend(&self) -> &'static str;

    /// Fetch one artist
    async fn find_by_id(&self, id: &ArtistId) -> Result<Option<Artist>, StoreError>;

    /// Fetch every artist in insertion order
    async fn find_all(&self) -> Result<Vec<Artist>, StoreError>;

    /// Insert a batch, assigning ids. Either every draft is stored or none is.
    async fn insert_many(&self, drafts: Vec<ArtistDraft>) -> Result<Vec<Artist>, StoreError>;

    /// Replace the whole document, returning the new state
    async fn find_by_id_and_update(
        &self,
        id: &ArtistId,
        draft: ArtistDraft,
    ) -> Result<Option<Artist>, StoreError>;

    /// Remove a document, returning what was removed
    async fn find_by_id_and_delete(&self, id: &ArtistId) -> Result<Option<Artist>, StoreError>;
}

/// Thread-safe shared store handle
pub type SharedArtistStore = Arc<dyn ArtistStore>;

// ============================================================================
// Unavailable Store
// ============================================================================

/// Stand-in used when the configured store could not be opened
///
/// The server keeps running and every store-backed request fails with
/// [`StoreError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl ArtistStore for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn find_by_id(&self, _id: &ArtistId) -> Result<Option<Artist>, StoreError> {
        Err(self.error())
    }

    async fn find_all(&self) -> Result<Vec<Artist>, StoreError> {
        Err(self.error())
    }

    async fn insert_many(&self, _drafts: Vec<ArtistDraft>) -> Result<Vec<Artist>, StoreError> {
        Err(self.error())
    }

    async fn find_by_id_and_update(
        &self,
        _id: &ArtistId,
        _draft: ArtistDraft,
    ) -> Result<Option<Artist>, StoreError> {
        Err(self.error())
    }

    async fn find_by_id_and_delete(&self, _id: &ArtistId) -> Result<Option<Artist>, StoreError> {
        Err(self.error())
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Open the backend named by the database configuration
pub fn open_store(config: &DatabaseConfig) -> Result<SharedArtistStore, StoreError> {
    match config.backend() {
        StoreBackend::Memory => Ok(Arc::new(MemoryArtistStore::new())),
        StoreBackend::SqliteInMemory => Ok(Arc::new(SqliteArtistStore::in_memory()?)),
        StoreBackend::SqliteFile(path) => Ok(Arc::new(SqliteArtistStore::new(path)?)),
        StoreBackend::Unsupported(url) => Err(StoreError::Unavailable(format!(
            "unsupported database url: {url}"
        ))),
    }
}

/// Open the configured store, falling back to [`UnavailableStore`] on failure
///
/// Startup never aborts because of the store; the failure is logged and
/// surfaces per request instead.
pub fn open_store_lenient(config: &DatabaseConfig) -> SharedArtistStore {
    match open_store(config) {
        Ok(store) => {
            tracing::info!(backend = store.backend(), url = %config.url, "Connected to document store");
            store
        }
        Err(e) => {
            tracing::error!(url = %config.url, error = %e, "Connection to document store failed");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Album, Song};

    fn create_test_stores() -> Vec<Box<dyn ArtistStore>> {
        vec![
            Box::new(SqliteArtistStore::in_memory().unwrap()),
            Box::new(MemoryArtistStore::new()),
        ]
    }

    fn draft(name: &str, songs: &[&str]) -> ArtistDraft {
        ArtistDraft {
            name: name.to_string(),
            albums: vec![Album {
                title: format!("{name} LP"),
                description: "Debut".to_string(),
                songs: songs
                    .iter()
                    .map(|t| Song {
                        title: t.to_string(),
                        length: "3:30".to_string(),
                    })
                    .collect(),
            }],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        for store in create_test_stores() {
            let created = store
                .insert_many(vec![draft("A", &["a1"]), draft("B", &[])])
                .await
                .unwrap();

            assert_eq!(created.len(), 2);
            assert_ne!(created[0].id, created[1].id);
            assert_eq!(created[0].clone().into_draft(), draft("A", &["a1"]));
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        for store in create_test_stores() {
            let created = store.insert_many(vec![draft("A", &["a1", "a2"])]).await.unwrap();
            let found = store.find_by_id(&created[0].id).await.unwrap();
            assert_eq!(found.as_ref(), Some(&created[0]));

            let missing = store.find_by_id(&ArtistId::generate()).await.unwrap();
            assert!(missing.is_none(), "{}", store.backend());
        }
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        for store in create_test_stores() {
            assert!(store.find_all().await.unwrap().is_empty());

            store.insert_many(vec![draft("C", &[]), draft("A", &[])]).await.unwrap();
            store.insert_many(vec![draft("B", &[])]).await.unwrap();

            let names: Vec<_> = store
                .find_all()
                .await
                .unwrap()
                .into_iter()
                .map(|a| a.name)
                .collect();
            assert_eq!(names, ["C", "A", "B"]);
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        for store in create_test_stores() {
            assert!(store.insert_many(vec![]).await.unwrap().is_empty());
            assert!(store.find_all().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_update_replaces_whole_document() {
        for store in create_test_stores() {
            let created = store.insert_many(vec![draft("A", &["a1"])]).await.unwrap();
            let id = created[0].id.clone();

            let replacement = ArtistDraft {
                name: "B".to_string(),
                albums: vec![],
            };
            let updated = store
                .find_by_id_and_update(&id, replacement.clone())
                .await
                .unwrap()
                .unwrap();

            assert_eq!(updated.id, id);
            assert_eq!(updated.clone().into_draft(), replacement);
            assert_eq!(store.find_by_id(&id).await.unwrap(), Some(updated));
        }
    }

    #[tokio::test]
    async fn test_update_missing() {
        for store in create_test_stores() {
            let result = store
                .find_by_id_and_update(&ArtistId::generate(), draft("A", &[]))
                .await
                .unwrap();
            assert!(result.is_none());
            assert!(store.find_all().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_delete() {
        for store in create_test_stores() {
            let created = store
                .insert_many(vec![draft("A", &["a1"]), draft("B", &[])])
                .await
                .unwrap();

            let deleted = store.find_by_id_and_delete(&created[0].id).await.unwrap();
            assert_eq!(deleted.as_ref(), Some(&created[0]));

            let again = store.find_by_id_and_delete(&created[0].id).await.unwrap();
            assert!(again.is_none());

            let remaining = store.find_all().await.unwrap();
            assert_eq!(remaining, vec![created[1].clone()]);
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = UnavailableStore::new("connection refused");
        let id = ArtistId::generate();

        assert!(matches!(store.find_all().await, Err(StoreError::Unavailable(_))));
        assert!(store.find_by_id(&id).await.is_err());
        assert!(store.insert_many(vec![draft("A", &[])]).await.is_err());
        assert!(store.find_by_id_and_update(&id, draft("A", &[])).await.is_err());
        assert!(store.find_by_id_and_delete(&id).await.is_err());

        let message = store.find_all().await.unwrap_err().to_string();
        assert_eq!(message, "Document store unavailable: connection refused");
    }

    #[test]
    fn test_open_store_backends() {
        let memory = open_store(&DatabaseConfig::new("memory://")).unwrap();
        assert_eq!(memory.backend(), "memory");

        let sqlite = open_store(&DatabaseConfig::new("sqlite::memory:")).unwrap();
        assert_eq!(sqlite.backend(), "sqlite");

        let unsupported = open_store(&DatabaseConfig::new("mongodb://localhost/music"));
        assert!(matches!(unsupported, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_open_store_lenient_falls_back() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // Parent "directory" is a regular file
        let path = file.path().join("catalog.db");
        let config = DatabaseConfig::new(format!("sqlite://{}", path.display()));

        let store = open_store_lenient(&config);
        assert_eq!(store.backend(), "unavailable");
    }
}
