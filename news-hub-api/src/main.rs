//! News Hub - Main Application Entry Point
//!
//! Serves the posts API on top of whichever storage backend the
//! environment selects.

use anyhow::Context;
use news_hub_api::{AppState, Settings};
use news_hub_storage::{DeadlineStorage, PostStorage};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,news_hub=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    tracing::info!("Starting News Hub server on {}", settings.bind_address());

    // A backend that cannot be reached is fatal
    let backend = news_hub_storage::open(settings.backend.clone())
        .await
        .context("Failed to initialize storage")?;
    let storage = Arc::new(DeadlineStorage::new(backend, settings.storage_timeout));
    tracing::info!("Using {} storage", storage.backend_name());

    let app_state = Arc::new(AppState::with_storage(storage.clone()));
    let app = news_hub_api::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    tracing::info!("Storage closed, bye");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
