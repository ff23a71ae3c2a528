use crate::config::ValidationError;
use scrobbler::ClientBuildError;

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
    #[error(transparent)]
    ClientBuild(#[from] ClientBuildError),
}
