// Framework bootstrap for the arena server runtime.

use crate::frameworks::config::{self, ServerConfig};
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::{AppState, SessionDefaults};
use crate::use_cases::SystemClock;

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves sessions on `listener` with the default configuration and shipped balance.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    serve(listener, ServerConfig::default()).await
}

pub async fn serve(listener: tokio::net::TcpListener, config: ServerConfig) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(&config)?;
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, tick_ms = config.tick_interval.as_millis(), "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let config = ServerConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::other(e)
    })?;
    let address = SocketAddr::from(([127, 0, 0, 1], config.port));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    serve(listener, config).await
}

fn build_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let tuning = config::load_tuning(config.tuning_path.as_deref()).map_err(|e| {
        tracing::error!(error = %e, "failed to load tuning");
        std::io::Error::other(e)
    })?;
    if let Some(path) = &config.tuning_path {
        tracing::info!(path = %path.display(), "tuning overrides loaded");
    }
    tracing::debug!(
        difficulty = %config.difficulty,
        controls = %config.controls,
        seed = ?config.seed,
        "session defaults configured"
    );

    Ok(Arc::new(AppState {
        defaults: SessionDefaults {
            difficulty: config.difficulty,
            controls: config.controls,
            seed: config.seed,
            tick_interval: config.tick_interval,
        },
        tuning: Arc::new(tuning),
        clock: Arc::new(SystemClock),
    }))
}
