//! songreq-web - Song request service
//!
//! Visitors submit song requests; the organizer logs in with Spotify and
//! imports pending requests into a new playlist.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songreq_common::config::TomlConfig;
use songreq_web::catalog::SpotifyCatalog;
use songreq_web::oauth::SpotifyOAuth;
use songreq_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songreq-web
#[derive(Parser, Debug)]
#[command(name = "songreq-web")]
#[command(about = "Song request intake and Spotify playlist import")]
#[command(version)]
struct Args {
    /// Path to config file (overrides SONGREQ_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SONGREQ_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONGREQ_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting songreq-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Playlist: '{}' (public: {}, batch size {})",
        config.playlist.name, config.playlist.public, config.playlist.batch_size
    );
    if !config.spotify.has_credentials() {
        warn!(
            "Spotify client credentials not configured. Search, login and import will fail \
             until SONGREQ_SPOTIFY_CLIENT_ID / SONGREQ_SPOTIFY_CLIENT_SECRET are set"
        );
    }

    let catalog = Arc::new(
        SpotifyCatalog::new(config.spotify.clone()).context("Failed to build catalog client")?,
    );
    let auth_flow =
        Arc::new(SpotifyOAuth::new(config.spotify.clone()).context("Failed to build OAuth client")?);

    let state = AppState::new(&config, catalog, auth_flow);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("songreq-web listening on http://{}", addr);
    info!("Organizer page: http://{}/admin", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
