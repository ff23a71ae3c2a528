use std::time::Duration;

/// Failures while talking to the scrobbling service.
///
/// A reply whose `status` is anything other than `ok` is not an error; it is
/// returned as a [`crate::ScrobbleStatus`].
#[derive(thiserror::Error, Debug)]
pub enum ScrobbleError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl ScrobbleError {
    /// True when the upstream could not be reached or did not answer in time.
    pub fn is_transport(&self) -> bool {
        matches!(self, ScrobbleError::Transport(_) | ScrobbleError::Timeout(_))
    }
}

#[derive(thiserror::Error, Debug)]
#[error("could not build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);
