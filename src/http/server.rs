//! Catalog server implementation
//!
//! Builds the router with its CORS and tracing layers and runs it on a tokio
//! listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::storage::{open_store_lenient, ArtistStore, SharedArtistStore};

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
///
/// Cloned into every handler; the store is the only thing requests share.
#[derive(Clone)]
pub struct AppState {
    /// Artist document store
    pub store: SharedArtistStore,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedArtistStore) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }

    /// State over any concrete store
    pub fn with_store(store: impl ArtistStore + 'static) -> Self {
        Self::new(Arc::new(store))
    }
}

// ============================================================================
// Catalog Server
// ============================================================================

/// Main catalog server
pub struct CatalogServer {
    config: Config,
    state: AppState,
    cors: CorsLayer,
}

impl CatalogServer {
    /// Create a server over an already opened store
    pub fn new(config: Config, store: SharedArtistStore) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let cors = cors_layer(&config.server.cors_origin)?;

        Ok(Self {
            config,
            state: AppState::new(store),
            cors,
        })
    }

    /// Create a server, opening the configured store
    ///
    /// A store that fails to open does not stop the server; see
    /// [`open_store_lenient`].
    pub fn from_config(config: Config) -> Result<Self, ServerError> {
        let store = open_store_lenient(&config.database);
        Self::new(config, store)
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone()).layer(self.cors.clone());

        // Add tracing layer if enabled
        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        tracing::info!(address = %addr, store = self.state.store.backend(), "Server is running");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address(),
            cors_origin: self.config.server.cors_origin.clone(),
            store_backend: self.state.store.backend(),
            request_logging_enabled: self.config.server.enable_request_logging,
        }
    }
}

/// CORS policy: one origin, the four CRUD methods, credentials allowed
fn cors_layer(origin: &str) -> Result<CorsLayer, ServerError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| ServerError::ConfigError(format!("Invalid CORS origin '{origin}': {e}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub cors_origin: String,
    pub store_backend: &'static str,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Artist Catalog Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             CORS Origin: {}\n\
             Store: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.cors_origin,
            self.store_backend,
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
