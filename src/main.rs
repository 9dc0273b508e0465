//! Wallet Service
//!
//! HTTP server for the wallet microservice.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! PORT=9000 DATABASE_URL=postgres://localhost/wallets cargo run
//! cargo run -- --registry-mode catalog --frappe-url https://erp.example.com
//! ```
//!
//! Configuration is read from flags, then environment variables (a `.env` file
//! is loaded first), then defaults. Without `DATABASE_URL` wallets are kept in
//! memory. Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_service::cli::{self, ServiceConfig};
use wallet_service::core::WalletStore;
use wallet_service::{create_router, AppState, MemoryWalletStore, PgWalletStore, WalletEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = cli::load_config();
    init_logging();

    let store = init_store(&config).await?;
    let registry = config
        .build_registry()
        .context("failed to build balance type registry")?;

    tracing::info!(
        registry_mode = ?config.registry_mode,
        persistent = config.database_url.is_some(),
        "wallet engine ready"
    );
    let engine = WalletEngine::new(store, registry, config.engine_config());
    let app = create_router(AppState::new(engine));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn init_store(config: &ServiceConfig) -> anyhow::Result<Arc<dyn WalletStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("connecting to database");
            let store =
                PgWalletStore::connect(url, config.db_max_connections, Duration::from_secs(10))
                    .await
                    .context("failed to connect to database")?;
            store.migrate().await.context("failed to migrate database")?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, wallets are kept in memory");
            Ok(Arc::new(MemoryWalletStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
