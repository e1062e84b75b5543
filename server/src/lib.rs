//! The Atelier project store server.
//!
//! Serves project CRUD over HTTP and accumulates chunked artboard
//! uploads. See [`config::Config`] for the knobs.

pub mod api;
pub mod assembly;
pub mod config;
pub mod database;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::{Extension, Router};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use assembly::ChunkAssembler;
use config::Config;

/// Global server state, shared by all requests.
#[derive(Clone)]
pub struct State {
    /// Server configuration.
    pub config: Arc<Config>,

    /// The chunk accumulator.
    pub assembler: Arc<ChunkAssembler>,

    /// Pooled database connection.
    database: DatabaseConnection,
}

impl State {
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// Runs the server until it receives a shutdown signal.
pub async fn run_server(config: Config) -> Result<()> {
    let database = database::connect(&config.database).await?;
    let assembler = Arc::new(ChunkAssembler::new(config.chunk_buffer.clone()));

    let state = State {
        config: Arc::new(config),
        assembler,
        database,
    };

    spawn_buffer_sweeper(state.clone());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state.clone()));

    let listener = TcpListener::bind(&state.config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", state.config.listen))?;

    info!("Atelier server listening on {}", state.config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

/// Periodically removes abandoned chunk buffer entries.
fn spawn_buffer_sweeper(state: State) {
    let interval = Duration::from_secs(state.config.chunk_buffer.sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(error) = state.assembler.sweep_expired(state.database()).await {
                tracing::warn!("Failed to sweep expired chunks: {}", error);
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
