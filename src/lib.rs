//! artist-catalog - REST API for music artists, their albums and songs
//!
//! Artists are the only independently addressable entity. Each one owns an
//! ordered list of albums, and each album an ordered list of songs; the whole
//! nested document is read, replaced and deleted as one unit.
//!
//! # Architecture
//!
//! - [`models`] - Artist/Album/Song types and request validation
//! - [`storage`] - Document store trait and its backends
//! - [`http`] - Router, handlers and server bootstrap
//! - [`config`] - Configuration from environment, TOML and CLI
//! - [`error`] - Error taxonomy and status-code mapping
//!
//! # Example
//!
//! ```no_run
//! use artist_catalog::config::Config;
//! use artist_catalog::http::CatalogServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = CatalogServer::from_config(config)?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::http::{AppState, CatalogServer};
    pub use crate::models::{Album, Artist, ArtistDraft, ArtistId, Song};
    pub use crate::storage::{ArtistStore, MemoryArtistStore, SharedArtistStore, SqliteArtistStore};
}

// Direct re-exports for convenience
pub use models::{Album, Artist, ArtistDraft, ArtistId, Song};
