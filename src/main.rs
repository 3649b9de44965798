mod commands;

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artist_catalog::config::Config;
use commands::serve::ServeOverrides;

#[derive(Parser)]
#[command(
    name = "artist-catalog",
    version,
    about = "REST API for a catalog of music artists, their albums and songs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (defaults to environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config value
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Listen host
        #[arg(long)]
        host: Option<IpAddr>,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Store url (memory://, sqlite::memory:, sqlite://<path>)
        #[arg(long)]
        database_url: Option<String>,

        /// Origin allowed to make cross-origin requests
        #[arg(long)]
        cors_origin: Option<String>,

        /// Disable per-request trace logging
        #[arg(long, default_value = "false")]
        no_request_logging: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Seed the environment from .env when present
    dotenvy::dotenv().ok();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            database_url,
            cors_origin,
            no_request_logging,
        } => {
            ServeOverrides {
                host,
                port,
                database_url,
                cors_origin,
                no_request_logging,
            }
            .apply(&mut config);

            setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;
            tracing::info!(
                address = %config.bind_address(),
                database = %config.database.url,
                cors_origin = %config.server.cors_origin,
                "Starting serve command"
            );
            commands::serve::serve(config).await?;
        }

        Commands::Config => {
            commands::config::show(&config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let directives = if verbose {
        String::from("artist_catalog=debug,tower_http=debug,info")
    } else {
        format!("artist_catalog={level},tower_http={level},warn")
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
