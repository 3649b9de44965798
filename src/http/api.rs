//! REST API handlers for the artist catalog
//!
//! Every handler makes one store call (the song listing makes one read and
//! flattens in memory) and maps the outcome to a JSON response. Failures are
//! returned as [`Error`] and rendered as `{"message": ...}` with the status
//! code of their category.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Artist, ArtistDraft, ArtistId, Song, ValidationError};

use super::server::AppState;

/// Message returned after a successful delete
pub const ARTIST_DELETED: &str = "Artist deleted successfully!";

// ============================================================================
// API Response Types
// ============================================================================

/// `{"message": ...}` body used for errors and the delete confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub store: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/artists", get(list_artists).post(create_artists))
        .route(
            "/api/artists/{id}",
            get(get_artist).put(replace_artist).delete(delete_artist),
        )
        .route("/api/artists/{id}/songs", get(list_artist_songs))
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<ArtistId> {
    Ok(raw.parse::<ArtistId>()?)
}

/// Unwrap a JSON body, turning axum's plain-text rejection into a JSON error
///
/// Bodies over the buffering limit keep axum's 413; every other rejection
/// (content type, syntax, shape) is a validation error.
fn json_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    body.map(|Json(value)| value).map_err(|rejection| match rejection {
        JsonRejection::BytesRejection(inner) if inner.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Error::PayloadTooLarge(inner.body_text())
        }
        other => ValidationError::Body(other.body_text()).into(),
    })
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        store: state.store.backend().to_string(),
    })
}

// ============================================================================
// Artist Handlers
// ============================================================================

/// List every artist
async fn list_artists(State(state): State<AppState>) -> Result<Json<Vec<Artist>>> {
    let artists = state.store.find_all().await?;
    tracing::debug!(count = artists.len(), "Listed artists");
    Ok(Json(artists))
}

/// Get one artist
async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Artist>> {
    let id = parse_id(&id)?;
    let artist = state.store.find_by_id(&id).await?.ok_or(Error::NotFound)?;
    Ok(Json(artist))
}

/// Create one artist or a batch
///
/// The whole payload is validated before anything is written, so a single
/// bad element rejects the batch.
async fn create_artists(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Artist>>)> {
    let drafts = ArtistDraft::batch_from_value(&json_body(body)?)?;
    let created = state.store.insert_many(drafts).await?;

    tracing::info!(count = created.len(), "Created artists");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a whole artist document
async fn replace_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Artist>> {
    let id = parse_id(&id)?;
    let draft = ArtistDraft::from_value(&json_body(body)?)?;

    let artist = state
        .store
        .find_by_id_and_update(&id, draft)
        .await?
        .ok_or(Error::NotFound)?;

    tracing::info!(id = %artist.id, "Replaced artist");
    Ok(Json(artist))
}

/// Delete an artist and everything nested in it
async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    let removed = state
        .store
        .find_by_id_and_delete(&id)
        .await?
        .ok_or(Error::NotFound)?;

    tracing::info!(id = %removed.id, albums = removed.albums.len(), "Deleted artist");
    Ok(Json(MessageResponse::new(ARTIST_DELETED)))
}

/// Every song of an artist, album by album
async fn list_artist_songs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Song>>> {
    let id = parse_id(&id)?;
    let artist = state.store.find_by_id(&id).await?.ok_or(Error::NotFound)?;

    let songs = artist.song_list();
    tracing::debug!(id = %artist.id, count = songs.len(), "Listed artist songs");
    Ok(Json(songs))
}

// ============================================================================
// Tests
// ============================================================================
