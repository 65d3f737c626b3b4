//! Seller Hub
//!
//! Dashboard backend for marketplace sellers: product import, keyword rank
//! tracking, SEO and social copy generation, and sales analytics.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────┐
//!                 │                      SELLER HUB                        │
//!   Client ──────▶│  http server ──▶ auth middleware ──▶ handlers          │
//!                 │                                        │               │
//!                 │        ┌───────────────┬───────────────┼───────────┐   │
//!                 │        ▼               ▼               ▼           ▼   │
//!                 │     store         providers          rank      exchange │
//!                 │  memory|hosted  llm/serp/stubs     refresh       CSV    │
//!                 │                                                        │
//!                 │  config (watch) · observability · security · lifecycle │
//!                 └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use seller_hub::config::loader::{apply_env_overrides, CONFIG_PATH_ENV};
use seller_hub::config::validation::validate_config;
use seller_hub::config::watcher::ConfigWatcher;
use seller_hub::config::{load_config, ConfigError, HubConfig};
use seller_hub::lifecycle::{build_state, signals, Shutdown};
use seller_hub::net::load_tls_config;
use seller_hub::observability::{logging, metrics};
use seller_hub::HttpServer;

fn config_path() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .or_else(|| std::env::args().nth(1))
        .map(PathBuf::from)
}

fn load(path: Option<&PathBuf>) -> Result<HubConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = HubConfig::default();
            apply_env_overrides(&mut config);
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let config = load(path.as_ref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "seller-hub starting");
    tracing::info!(
        config = ?path,
        bind_address = %config.listener.bind_address,
        backend = ?config.backend.mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let state = build_state(&config)?;
    let store = state.store.clone();

    // The watcher must stay alive for reloads to arrive.
    let (config_updates, _watcher) = match &path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (updates, Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (mpsc::unbounded_channel().1, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(signals::wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(&config, state);
    match &config.listener.tls {
        Some(tls) => {
            let rustls = load_tls_config(tls).await?;
            let addr = config.listener.bind_address.parse()?;
            server
                .run_tls(addr, rustls, config_updates, shutdown.subscribe())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, shutdown.subscribe()).await?;
        }
    }

    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to persist store on shutdown");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
