use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use tickerfolio_core::constants::{DEFAULT_BASE_CURRENCY, DEFAULT_DISPLAY_CURRENCY};
use tickerfolio_core::sync::SyncOptions;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub alpha_vantage_api_key: String,
    pub quote_timeout: Duration,
    pub sync: SyncOptions,
    pub base_currency: String,
    pub display_currency: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads `TF_*` variables, after loading a `.env` file if present.
    ///
    /// Numeric values that do not parse fall back to their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("TF_LISTEN_ADDR", "127.0.0.1:8080")
            .parse()
            .context("Invalid TF_LISTEN_ADDR")?;
        let db_path = env_or("TF_DB_PATH", "./db/app.db");
        let alpha_vantage_api_key = env_or("TF_ALPHA_VANTAGE_API_KEY", "demo");
        let cors_allow = env_or("TF_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let sync = SyncOptions {
            max_attempts: env_parse("TF_REFRESH_MAX_ATTEMPTS", 1),
            retry_backoff: Duration::from_millis(env_parse("TF_REFRESH_RETRY_BACKOFF_MS", 2000)),
            request_spacing: Duration::from_millis(env_parse("TF_REFRESH_SPACING_MS", 0)),
        };

        Ok(Self {
            listen_addr,
            db_path,
            alpha_vantage_api_key,
            quote_timeout: Duration::from_millis(env_parse("TF_QUOTE_TIMEOUT_MS", 10_000)),
            sync,
            base_currency: env_or("TF_BASE_CURRENCY", DEFAULT_BASE_CURRENCY),
            display_currency: env_or("TF_DISPLAY_CURRENCY", DEFAULT_DISPLAY_CURRENCY),
            cors_allow,
            request_timeout: Duration::from_millis(env_parse("TF_REQUEST_TIMEOUT_MS", 120_000)),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
