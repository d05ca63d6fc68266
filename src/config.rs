use std::time::Duration;

use serde::Deserialize;

use crate::services::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origin: String,
    /// Attempts per relocation before a `Conflict` is surfaced to the caller.
    pub move_max_attempts: u32,
    pub move_retry_backoff_ms: u64,
    pub transaction_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Builds the config from `lookup`. A malformed value falls back to the
    /// default for that field alone.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            move_max_attempts: parse_or(&lookup, "MOVE_MAX_ATTEMPTS", defaults.move_max_attempts),
            move_retry_backoff_ms: parse_or(
                &lookup,
                "MOVE_RETRY_BACKOFF_MS",
                defaults.move_retry_backoff_ms,
            ),
            transaction_timeout_ms: parse_or(
                &lookup,
                "TRANSACTION_TIMEOUT_MS",
                defaults.transaction_timeout_ms,
            ),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.move_max_attempts.max(1),
            backoff: Duration::from_millis(self.move_retry_backoff_ms),
            timeout: Duration::from_millis(self.transaction_timeout_ms),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                "Invalid {}={:?} ({}), using default {:?}",
                key,
                raw,
                e,
                default
            );
            default
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 21547,
            database_url: "sqlite:taskboard.db".into(),
            cors_origin: "http://localhost:21548,http://127.0.0.1:21548".into(),
            move_max_attempts: 3,
            move_retry_backoff_ms: 25,
            transaction_timeout_ms: 5_000,
        }
    }
}
