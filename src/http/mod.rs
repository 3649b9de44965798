//! HTTP surface of the catalog
//!
//! # Routes
//!
//! ```text
//! GET    /api/health
//! GET    /api/artists              list artists
//! POST   /api/artists              create one artist or a batch
//! GET    /api/artists/{id}         get artist
//! PUT    /api/artists/{id}         replace artist document
//! DELETE /api/artists/{id}         delete artist
//! GET    /api/artists/{id}/songs   every song of the artist, album by album
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use artist_catalog::config::Config;
//! use artist_catalog::http::CatalogServer;
//!
//! let server = CatalogServer::from_config(Config::default())?;
//! server.start().await?;
//! ```

pub mod api;
pub mod server;

// Re-export main types
pub use api::{create_router, HealthResponse, MessageResponse};
pub use server::{AppState, CatalogServer, ServerError, ServerInfo};
