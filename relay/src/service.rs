use crate::errors::RelayError;
use crate::form::parse_track_play;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT, SCROBBLES};
use http::header::{ALLOW, HeaderValue};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use scrobbler::{ScrobbleError, Scrobbler};
use shared::http::{make_boxed_error_response, make_text_response};
use shared::{counter, gauge, histogram};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

pub const SCROBBLE_PATH: &str = "/scrobble";

const OUTCOME_OK: &str = "ok";
const OUTCOME_FAILED: &str = "failed";
const OUTCOME_TRANSPORT_ERROR: &str = "transport_error";
const OUTCOME_MALFORMED_RESPONSE: &str = "malformed_response";

const STATUS_ABORTED: &str = "aborted";

type RelayResponse = Response<BoxBody<Bytes, RelayError>>;

/// Accepts `POST /scrobble` and answers with the upstream `lfm` status.
pub struct RelayService {
    scrobbler: Scrobbler,
    max_body_bytes: usize,
}

impl RelayService {
    pub fn new(scrobbler: Scrobbler, max_body_bytes: usize) -> Self {
        Self {
            scrobbler,
            max_body_bytes,
        }
    }
}

impl Service<Request<Incoming>> for RelayService {
    type Response = RelayResponse;
    type Error = RelayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let scrobbler = self.scrobbler.clone();
        let max_body_bytes = self.max_body_bytes;

        Box::pin(async move {
            let mut guard = RequestGuard::start();
            let response = handle(&scrobbler, max_body_bytes, req).await;
            guard.finish(response.status());
            Ok(response)
        })
    }
}

/// Tracks one inbound request in the inflight gauge and duration histogram.
///
/// Recording happens on drop, so a request whose future is dropped before
/// completion (client went away) is still accounted for, tagged `aborted`.
struct RequestGuard {
    start: Instant,
    status: Option<StatusCode>,
}

impl RequestGuard {
    fn start() -> Self {
        gauge!(REQUESTS_INFLIGHT).increment(1.0);
        Self {
            start: Instant::now(),
            status: None,
        }
    }

    fn finish(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let status = match self.status {
            Some(status) => status.as_str().to_owned(),
            None => STATUS_ABORTED.to_owned(),
        };
        histogram!(REQUEST_DURATION, "status" => status)
            .record(self.start.elapsed().as_secs_f64());
        gauge!(REQUESTS_INFLIGHT).decrement(1.0);
    }
}

/// Metric outcome and response status for a submission that did not yield a status.
fn error_outcome(error: &ScrobbleError) -> (&'static str, StatusCode) {
    match error {
        ScrobbleError::Timeout(_) => (OUTCOME_TRANSPORT_ERROR, StatusCode::GATEWAY_TIMEOUT),
        e if e.is_transport() => (OUTCOME_TRANSPORT_ERROR, StatusCode::BAD_GATEWAY),
        _ => (OUTCOME_MALFORMED_RESPONSE, StatusCode::BAD_GATEWAY),
    }
}

async fn handle(
    scrobbler: &Scrobbler,
    max_body_bytes: usize,
    req: Request<Incoming>,
) -> RelayResponse {
    if req.uri().path() != SCROBBLE_PATH {
        tracing::debug!(path = %req.uri().path(), "No route matched");
        return make_boxed_error_response(StatusCode::NOT_FOUND);
    }

    if req.method() != Method::POST {
        let mut response = make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    let body = match Limited::new(req.into_body(), max_body_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            tracing::warn!(limit = max_body_bytes, "Request body too large");
            return make_boxed_error_response(StatusCode::PAYLOAD_TOO_LARGE);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return make_boxed_error_response(StatusCode::BAD_REQUEST);
        }
    };

    let play = parse_track_play(&body);

    match scrobbler.submit(play).await {
        Ok(status) => {
            let outcome = if status.is_ok() {
                OUTCOME_OK
            } else {
                OUTCOME_FAILED
            };
            counter!(SCROBBLES, "outcome" => outcome).increment(1);
            tracing::debug!(status = %status, "Scrobble forwarded");

            make_text_response(StatusCode::OK, status.into_string())
        }
        Err(e) => {
            let (outcome, status_code) = error_outcome(&e);
            counter!(SCROBBLES, "outcome" => outcome).increment(1);
            tracing::error!(
                error = %e,
                upstream = %scrobbler.endpoint(),
                "Scrobble submission failed"
            );

            make_boxed_error_response(status_code)
        }
    }
}
