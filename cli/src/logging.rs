//! # Logging
//!
//! Installs the global `tracing` subscriber. Diagnostics go to stderr; stdout
//! carries the `check` summary only.

use flowheater_core::{AppError, AppResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initializes logging with `level` as the default filter.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: &str) -> AppResult<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => EnvFilter::try_new(from_env),
        _ => EnvFilter::try_new(level),
    }
    .map_err(|e| AppError::General(format!("invalid log level: {e}")))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::General(format!("failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        // Only meaningful when RUST_LOG does not override the level.
        if std::env::var(EnvFilter::DEFAULT_ENV).is_err() {
            let err = init("flowheater=loud").unwrap_err();
            assert!(err.to_string().contains("invalid log level"));
        }
    }
}
