//! SQLite-backed artist store
//!
//! Each artist is one row holding the whole nested document as JSON, so the
//! store behaves like a document collection: albums and songs never get rows
//! of their own. Insertion order is kept by an autoincrement sequence column.
//!
//! `rusqlite` is synchronous, so every operation runs on the blocking pool
//! with the connection behind a `Mutex`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::{ArtistStore, StoreError};
use crate::models::{Artist, ArtistDraft, ArtistId, InvalidArtistId};

/// SQLite implementation of [`ArtistStore`]
pub struct SqliteArtistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteArtistStore {
    /// Open (or create) a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self::with_connection(conn)?;
        tracing::info!(path = %path.display(), "SQLite artist store initialized");
        Ok(store)
    }

    /// Create in-memory database (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS artists (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    document TEXT NOT NULL
                );
                "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn decode(id: String, document: &str) -> Result<Artist, StoreError> {
    let artist_id: ArtistId = id.parse().map_err(|e: InvalidArtistId| StoreError::Corrupt {
        id: id.clone(),
        reason: e.to_string(),
    })?;
    let draft: ArtistDraft = serde_json::from_str(document)?;
    Ok(Artist::from_draft(artist_id, draft))
}

#[async_trait]
impl ArtistStore for SqliteArtistStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn find_by_id(&self, id: &ArtistId) -> Result<Option<Artist>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let document: Option<String> = conn
                .query_row(
                    "SELECT document FROM artists WHERE id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            document
                .map(|doc| decode(id.into(), &doc))
                .transpose()
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Artist>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, document FROM artists ORDER BY seq")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, doc)| decode(id, &doc))
                .collect()
        })
        .await
    }

    async fn insert_many(&self, drafts: Vec<ArtistDraft>) -> Result<Vec<Artist>, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut created = Vec::with_capacity(drafts.len());

            {
                let mut stmt = tx.prepare("INSERT INTO artists (id, document) VALUES (?1, ?2)")?;
                for draft in drafts {
                    let id = ArtistId::generate();
                    let document = serde_json::to_string(&draft)?;
                    stmt.execute(params![id.as_str(), document])?;
                    created.push(Artist::from_draft(id, draft));
                }
            }

            tx.commit()?;
            Ok(created)
        })
        .await
    }

    async fn find_by_id_and_update(
        &self,
        id: &ArtistId,
        draft: ArtistDraft,
    ) -> Result<Option<Artist>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let document = serde_json::to_string(&draft)?;
            let changed = conn.execute(
                "UPDATE artists SET document = ?2 WHERE id = ?1",
                params![id.as_str(), document],
            )?;

            if changed == 0 {
                return Ok(None);
            }
            Ok(Some(Artist::from_draft(id, draft)))
        })
        .await
    }

    async fn find_by_id_and_delete(&self, id: &ArtistId) -> Result<Option<Artist>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let document: Option<String> = conn
                .query_row(
                    "DELETE FROM artists WHERE id = ?1 RETURNING document",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            document
                .map(|doc| decode(id.into(), &doc))
                .transpose()
        })
        .await
    }
}
