//! Subscriber setup for the server binary.
//!
//! Library code logs through the `log` facade; `try_init` also installs the
//! `tracing-log` bridge so those records reach the fmt subscriber.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("logging error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// `RUST_LOG` wins over the configured level.
pub fn build_filter(log_level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).map_err(|source| LoggingError::EnvFilter {
            value: log_level.to_string(),
            source,
        }),
    }
}

pub fn init(log_level: &str) -> Result<(), LoggingError> {
    let env_filter = build_filter(log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(LoggingError::Subscriber)
}
