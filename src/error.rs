//! Unified error handling for the catalog
//!
//! Every handler failure is one of a small set of kinds, each with its own
//! HTTP status:
//!
//! - [`Error::NotFound`]: the id is well-formed but no artist has it (404)
//! - [`Error::InvalidId`]: the id is not a well-formed artist id (400)
//! - [`Error::Validation`]: the request body failed validation (400)
//! - [`Error::PayloadTooLarge`]: the request body exceeded the size limit (413)
//! - [`Error::Store`]: the document store failed (500)
//!
//! Startup configuration problems never reach a handler; they are reported
//! through `anyhow` and [`ServerError`](crate::http::ServerError).

use axum::http::StatusCode;
use thiserror::Error;

pub use crate::models::{InvalidArtistId, ValidationError};
pub use crate::storage::StoreError;

/// Message returned for unknown artist ids
pub const ARTIST_NOT_FOUND: &str = "Artist not found";

/// Classification of errors for status-code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Lookup by id found nothing
    NotFound,
    /// The caller sent something unusable
    Client,
    /// The caller sent more than the server will buffer
    TooLarge,
    /// Persistence failure
    Storage,
}

impl ErrorCategory {
    /// HTTP status for this category
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Client => StatusCode::BAD_REQUEST,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unified error type for the catalog
#[derive(Error, Debug)]
pub enum Error {
    /// No artist with the requested id
    #[error("{}", ARTIST_NOT_FOUND)]
    NotFound,

    /// Malformed artist id
    #[error(transparent)]
    InvalidId(#[from] InvalidArtistId),

    /// Request body failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request body over the buffering limit
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// Document store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound => ErrorCategory::NotFound,
            Self::InvalidId(_) | Self::Validation(_) => ErrorCategory::Client,
            Self::PayloadTooLarge(_) => ErrorCategory::TooLarge,
            Self::Store(_) => ErrorCategory::Storage,
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
