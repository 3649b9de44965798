//! Common test utilities

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use artist_catalog::http::{create_router, AppState};
use artist_catalog::storage::{MemoryArtistStore, SqliteArtistStore, UnavailableStore};

/// One router per store backend, so every scenario runs against both
pub fn routers() -> Vec<(&'static str, Router)> {
    vec![
        (
            "memory",
            create_router(AppState::with_store(MemoryArtistStore::new())),
        ),
        (
            "sqlite",
            create_router(AppState::with_store(SqliteArtistStore::in_memory().unwrap())),
        ),
    ]
}

/// Router whose store failed to open
#[allow(dead_code)]
pub fn unavailable_router() -> Router {
    create_router(AppState::with_store(UnavailableStore::new(
        "connection refused",
    )))
}

/// Send a request and decode the JSON response (`Null` for an empty body)
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    send_request(router, request).await
}

/// Send a prepared request
pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
        assert_eq!(content_type, "application/json");
    }

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Create artists and return the response body array
#[allow(dead_code)]
pub async fn create(router: &Router, body: Value) -> Vec<Value> {
    let (status, value) = send(router, Method::POST, "/api/artists", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value.as_array().cloned().unwrap()
}

/// Drop the store-assigned id from an artist document
#[allow(dead_code)]
pub fn without_id(mut artist: Value) -> Value {
    if let Some(obj) = artist.as_object_mut() {
        obj.remove("id");
    }
    artist
}

/// Artist with two albums (two songs, then one song)
#[allow(dead_code)]
pub fn sample_artist() -> Value {
    json!({
        "name": "Miles Davis",
        "albums": [
            {
                "title": "Kind of Blue",
                "description": "Modal jazz, 1959",
                "songs": [
                    {"title": "So What", "length": "9:22"},
                    {"title": "Freddie Freeloader", "length": "9:46"}
                ]
            },
            {
                "title": "Bitches Brew",
                "description": "Fusion, 1970",
                "songs": [
                    {"title": "Spanish Key", "length": "17:34"}
                ]
            }
        ]
    })
}

/// A well-formed id that no store will contain
#[allow(dead_code)]
pub const MISSING_ID: &str = "65a1b2c3d4e5f60718293a4b";
