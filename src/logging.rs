//! # Structured Logging Module
//!
//! Environment-aware structured logging for debugging the concurrent
//! reservation paths and the expiry sweep.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level)),
        );

        // Use try_init to avoid panic if a global subscriber already exists
        // (e.g. set by the embedding application).
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            environment = %environment,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("TEESHEET_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
    }
}
