use anyhow::{Context, Result};
use std::net::IpAddr;

use artist_catalog::config::Config;
use artist_catalog::http::CatalogServer;

/// Command-line overrides for the server section of the config
#[derive(Debug, Default, Clone)]
pub struct ServeOverrides {
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub cors_origin: Option<String>,
    pub no_request_logging: bool,
}

impl ServeOverrides {
    /// Apply the overrides on top of a loaded config
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(origin) = self.cors_origin {
            config.server.cors_origin = origin;
        }
        if self.no_request_logging {
            config.server.enable_request_logging = false;
        }
    }
}

/// Run the API server until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let server = CatalogServer::from_config(config).context("Failed to create server")?;

    tracing::info!("\n{}", server.info().display());

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("Server terminated with an error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        ServeOverrides {
            port: Some(8080),
            database_url: Some("sqlite://catalog.db".to_string()),
            no_request_logging: true,
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite://catalog.db");
        assert!(!config.server.enable_request_logging);
        assert_eq!(config.server.cors_origin, "http://localhost:3000");
    }
}
