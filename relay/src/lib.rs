pub mod config;
mod errors;
mod form;
pub mod metrics_defs;
mod service;

pub use errors::RelayError;
pub use service::{RelayService, SCROBBLE_PATH};

use scrobbler::Scrobbler;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::time::Duration;

pub async fn run(config: config::Config) -> Result<(), RelayError> {
    config.validate()?;

    let scrobbler = Scrobbler::new(
        config.upstream.url.clone(),
        config.credentials.clone(),
        Duration::from_secs(config.upstream.timeout_secs),
    )?;

    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    tracing::info!(
        upstream = %config.upstream.url,
        timeout_secs = config.upstream.timeout_secs,
        "Starting scrobble relay"
    );

    let relay_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        RelayService::new(scrobbler, config.max_body_bytes),
    );
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, RelayError>::new(|| true),
    );

    tokio::try_join!(relay_task, admin_task)?;
    Ok(())
}
