use crate::config::LoggingConfig;
use sentry::types::{Dsn, ParseDsnError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("invalid sentry dsn: {0}")]
    InvalidDsn(#[from] ParseDsnError),
    #[error("could not install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Installs the global tracing subscriber, reporting errors to Sentry when a
/// DSN is configured. The returned guard flushes Sentry on drop.
pub fn init(config: &LoggingConfig) -> Result<Option<sentry::ClientInitGuard>, LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let guard = match &config.sentry_dsn {
        Some(dsn) => {
            let dsn: Dsn = dsn.parse()?;
            Some(sentry::init(sentry::ClientOptions {
                dsn: Some(dsn),
                release: sentry::release_name!(),
                ..Default::default()
            }))
        }
        None => None,
    };

    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .try_init()?;

    Ok(guard)
}
