//! Server settings read from the environment

use anyhow::{Context, Result};
use news_hub_storage::BackendConfig;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5000;

/// Process-wide settings, resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub backend: BackendConfig,
    pub storage_timeout: Duration,
}

impl Settings {
    /// Load from process environment (a `.env` file is applied first if present)
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid u16, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let timeout_ms = match lookup("STORAGE_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("STORAGE_TIMEOUT_MS must be milliseconds, got '{}'", raw))?,
            None => DEFAULT_STORAGE_TIMEOUT_MS,
        };

        let backend = BackendConfig::from_kind(
            lookup("DATABASE_TYPE").as_deref(),
            lookup("POSTGRES_CONNECTION_STRING"),
            lookup("MONGO_CONNECTION_STRING"),
        )
        .context("Invalid storage configuration")?
        .with_mongo_names(lookup("MONGO_DATABASE"), lookup("MONGO_COLLECTION"));

        Ok(Self {
            host,
            port,
            backend,
            storage_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
