mod config;
mod logging;
mod statsd;

use clap::Parser;
use config::{Config, ConfigError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about = "Signs and forwards track plays to an audioscrobbler service")]
enum CliCommand {
    /// Run the relay until it fails
    Run {
        #[arg(long)]
        config_file_path: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Relay(#[from] relay::RelayError),
}

fn main() {
    let cli = CliCommand::parse();

    match cli {
        CliCommand::Run { config_file_path } => {
            if let Err(e) = run(&config_file_path) {
                eprintln!("scrobble-relay: {e}");
                process::exit(1);
            }
        }
    }
}

fn run(config_file_path: &std::path::Path) -> Result<(), CliError> {
    let config = Config::from_file(config_file_path)?;

    let logging_config = config.common.logging.clone().unwrap_or_default();
    let _sentry_guard = logging::init(&logging_config)?;

    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config)?;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(relay::run(config.relay)).inspect_err(|e| {
        tracing::error!(error = %e, "Relay stopped");
    })?;

    Ok(())
}
