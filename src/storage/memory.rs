//! In-memory artist store
//!
//! Useful for tests and for running the API without a database. Documents
//! are lost when the process exits.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ArtistStore, StoreError};
use crate::models::{Artist, ArtistDraft, ArtistId};

/// Insertion-ordered artist documents behind a read-write lock
#[derive(Debug, Default)]
pub struct MemoryArtistStore {
    artists: RwLock<Vec<Artist>>,
}

impl MemoryArtistStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtistStore for MemoryArtistStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_id(&self, id: &ArtistId) -> Result<Option<Artist>, StoreError> {
        let artists = self.artists.read().await;
        Ok(artists.iter().find(|a| &a.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Artist>, StoreError> {
        Ok(self.artists.read().await.clone())
    }

    async fn insert_many(&self, drafts: Vec<ArtistDraft>) -> Result<Vec<Artist>, StoreError> {
        let created: Vec<Artist> = drafts
            .into_iter()
            .map(|draft| Artist::from_draft(ArtistId::generate(), draft))
            .collect();

        self.artists.write().await.extend(created.iter().cloned());
        Ok(created)
    }

    async fn find_by_id_and_update(
        &self,
        id: &ArtistId,
        draft: ArtistDraft,
    ) -> Result<Option<Artist>, StoreError> {
        let mut artists = self.artists.write().await;
        let Some(slot) = artists.iter_mut().find(|a| &a.id == id) else {
            return Ok(None);
        };

        *slot = Artist::from_draft(id.clone(), draft);
        Ok(Some(slot.clone()))
    }

    async fn find_by_id_and_delete(&self, id: &ArtistId) -> Result<Option<Artist>, StoreError> {
        let mut artists = self.artists.write().await;
        let removed = artists
            .iter()
            .position(|a| &a.id == id)
            .map(|index| artists.remove(index));
        Ok(removed)
    }
}
