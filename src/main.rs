//! Entry point: load configuration, wire up logging, bind the listener,
//! and serve until asked to shut down.
//!
//! Grounded on the teacher's `main.rs` for the `tokio::main` + tracing
//! bootstrap shape; the `CancellationToken`/`ctrl_c` shutdown wiring
//! is grounded on `server.rs`'s use of the same token to close
//! connections with `GOING_AWAY` (spec §7).

mod config;
mod constants;
mod docs;
mod error;
mod game;
mod player;
mod protocol;
mod render;
mod scores;
mod server;
mod snake;
mod spawner;
mod types;
mod world;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snake_arena=info,tower_http=info")))
        .init();

    let settings = match config::Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(err) => {
            error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        host = %settings.host,
        port = settings.port,
        field = format!("{}x{}", settings.field_size_x, settings.field_size_y),
        max_players = settings.max_players,
        "starting snake arena server"
    );

    let shutdown = CancellationToken::new();
    let app = server::create_app(settings.clone(), shutdown.clone());

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(%addr, "listening");

    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown_signal.cancel();
        }
    });

    let serve_shutdown = shutdown.clone();
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
        .await
    {
        error!(%err, "server error");
        std::process::exit(1);
    }
}
