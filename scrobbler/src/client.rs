use crate::errors::{ClientBuildError, ScrobbleError};
use crate::params::{ScrobbleParameters, SignedScrobble, TrackPlay};
use crate::response::{ScrobbleStatus, parse_status};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://ws.audioscrobbler.com/2.0/";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Application credentials issued by the scrobbling service.
#[derive(Clone, Deserialize, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Builds, signs and submits scrobbles. Cheap to clone.
#[derive(Clone)]
pub struct Scrobbler {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Arc<Credentials>,
    timeout: Duration,
}

impl Scrobbler {
    pub fn new(
        endpoint: Url,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Scrobbler {
            client,
            endpoint,
            credentials: Arc::new(credentials),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Signs the parameters for `play` without sending anything.
    pub fn build(&self, play: TrackPlay) -> SignedScrobble {
        ScrobbleParameters::new(&self.credentials.api_key, play).sign(&self.credentials.secret)
    }

    /// Posts a single signed scrobble and returns the upstream `lfm` status.
    ///
    /// The timeout covers connecting, sending and reading the whole reply body.
    /// The upstream answers with an `lfm` document on HTTP errors as well, so
    /// the HTTP status code is only logged.
    pub async fn submit(&self, play: TrackPlay) -> Result<ScrobbleStatus, ScrobbleError> {
        let body = self.build(play).form_body();

        let exchange = async {
            let response = self
                .client
                .post(self.endpoint.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body)
                .send()
                .await?;
            let http_status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((http_status, body))
        };

        let (http_status, body) = timeout(self.timeout, exchange)
            .await
            .map_err(|_| ScrobbleError::Timeout(self.timeout))??;

        tracing::debug!(
            endpoint = %self.endpoint,
            http_status = %http_status,
            "Received upstream response"
        );

        let text = std::str::from_utf8(&body).map_err(|e| {
            ScrobbleError::MalformedResponse(format!("response is not valid UTF-8: {e}"))
        })?;
        let status = parse_status(text)?;

        if let Some(error) = status.error() {
            tracing::warn!(
                status = %status,
                code = ?error.code,
                message = %error.message,
                "Upstream rejected scrobble"
            );
        }

        Ok(status)
    }
}
