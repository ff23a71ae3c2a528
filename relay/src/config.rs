use scrobbler::{Credentials, DEFAULT_ENDPOINT};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty api_key")]
    EmptyApiKey,

    #[error("Empty secret")]
    EmptySecret,

    #[error("Upstream timeout cannot be 0")]
    InvalidTimeout,

    #[error("max_body_bytes cannot be 0")]
    InvalidMaxBodyBytes,
}

/// Relay configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener accepting scrobble submissions
    pub listener: Listener,
    /// Admin listener for health and readiness checks
    pub admin_listener: Listener,
    /// Scrobbling web service the relay forwards to
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Application credentials used to sign every submission
    pub credentials: Credentials,
    /// Largest inbound body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Config {
    /// Validates the relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.upstream.validate()?;

        if self.credentials.api_key.is_empty() {
            return Err(ValidationError::EmptyApiKey);
        }
        if self.credentials.secret.is_empty() {
            return Err(ValidationError::EmptySecret);
        }
        if self.max_body_bytes == 0 {
            return Err(ValidationError::InvalidMaxBodyBytes);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Upstream scrobbling service
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Endpoint receiving the form POST
    #[serde(default = "default_upstream_url")]
    pub url: Url,
    /// Bound on the whole upstream exchange
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            url: default_upstream_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_upstream_url() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}
