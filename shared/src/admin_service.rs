use crate::http::{make_boxed_error_response, make_text_response};
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Serves `/health` and `/ready` on the admin listener.
pub struct AdminService<F, E> {
    is_ready: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            _error: PhantomData,
        }
    }
}

impl<F, E> Service<Request<Incoming>> for AdminService<F, E>
where
    F: Fn() -> bool,
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let is_ready = (self.is_ready)();

        Box::pin(async move {
            let res = match req.uri().path() {
                "/health" => make_text_response(StatusCode::OK, "ok\n"),
                "/ready" => match is_ready {
                    true => make_text_response(StatusCode::OK, "ok\n"),
                    false => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
                },
                _ => make_boxed_error_response(StatusCode::NOT_FOUND),
            };
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::serve;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::net::TcpListener;

    async fn start_admin(ready: Arc<AtomicBool>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let service: AdminService<_, std::io::Error> =
            AdminService::new(move || ready.load(Ordering::Relaxed));
        tokio::spawn(serve(listener, service));
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_admin_endpoints() {
        let ready = Arc::new(AtomicBool::new(false));
        let base = start_admin(ready.clone()).await;
        let client = reqwest::Client::new();

        let res = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.text().await.unwrap(), "ok\n");

        let res = client.get(format!("{base}/ready")).send().await.unwrap();
        assert_eq!(res.status(), 503);

        ready.store(true, Ordering::Relaxed);
        let res = client.get(format!("{base}/ready")).send().await.unwrap();
        assert_eq!(res.status(), 200);

        let res = client.get(format!("{base}/metrics")).send().await.unwrap();
        assert_eq!(res.status(), 404);
    }
}
