//! Fixed-upstream pass-through.
//!
//! # Responsibilities
//! - Issue one GET to the configured upstream per proxied request
//! - Relay status, every header value and the body stream unchanged
//! - Turn transport failures into `500` with the error text
//!
//! # Design Decisions
//! - Nothing from the inbound request is forwarded
//! - No retries; a failed fetch ends that request only
//! - The body is streamed, never buffered, so its size is unbounded
//! - No timeout on the outbound call; only the optional server-wide
//!   request deadline applies

use std::error::Error as StdError;

use axum::{
    body::{Body, Bytes, HttpBody},
    http::{Method, Request, Response as HttpResponse, StatusCode, Uri},
    response::{IntoResponse, Response},
    BoxError,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::http::response::text_error;

/// HTTP client used to reach the upstream.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Failures of the outbound call.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request to {uri} failed: {detail}")]
    Upstream { uri: Uri, detail: String },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        text_error(StatusCode::INTERNAL_SERVER_ERROR, &self.to_string())
    }
}

/// Relays a single fixed upstream.
#[derive(Clone)]
pub struct ProxyHandler {
    upstream: Uri,
    client: UpstreamClient,
}

impl ProxyHandler {
    pub fn new(upstream: Uri) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self::with_client(upstream, client)
    }

    pub fn with_client(upstream: Uri, client: UpstreamClient) -> Self {
        Self { upstream, client }
    }

    pub fn upstream(&self) -> &Uri {
        &self.upstream
    }

    /// Fetch the upstream and relay its response.
    pub async fn handle(&self) -> Response {
        tracing::info!(upstream = %self.upstream, "Proxying request");

        match self.fetch().await {
            Ok(upstream) => {
                tracing::debug!(status = %upstream.status(), "Upstream responded");
                relay(upstream)
            }
            Err(e) => {
                tracing::error!(upstream = %self.upstream, error = %e, "Upstream request failed");
                e.into_response()
            }
        }
    }

    /// Issue the outbound GET.
    pub async fn fetch(&self) -> Result<HttpResponse<Incoming>, ProxyError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.upstream.clone())
            .body(Body::empty())?;

        self.client
            .request(request)
            .await
            .map_err(|e| ProxyError::Upstream {
                uri: self.upstream.clone(),
                detail: error_chain(&e),
            })
    }
}

impl std::fmt::Debug for ProxyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyHandler")
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}

/// Copy status and headers, then stream the body.
///
/// Headers are appended one value at a time so repeated fields such as
/// `set-cookie` survive with every value.
pub fn relay<B>(upstream: HttpResponse<B>) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = upstream.into_parts();

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;

    let headers = response.headers_mut();
    for (name, value) in parts.headers.iter() {
        headers.append(name.clone(), value.clone());
    }
    response
}

/// Render an error and all of its sources, outermost first.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);
    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("client error (Connect)")
        }
    }
    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }
    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }
    impl StdError for Inner {}

    #[test]
    fn test_error_chain_includes_sources() {
        assert_eq!(
            error_chain(&Outer(Inner)),
            "client error (Connect): connection refused"
        );
    }

    #[tokio::test]
    async fn test_relay_preserves_status_headers_and_body() {
        let upstream = HttpResponse::builder()
            .status(StatusCode::IM_A_TEAPOT)
            .header("x-upstream", "yes")
            .header(header::SET_COOKIE, "a=1")
            .header(header::SET_COOKIE, "b=2")
            .body(Body::from("short and stout"))
            .unwrap();

        let response = relay(upstream);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers()["x-upstream"], "yes");

        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"short and stout");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500_with_text() {
        // Reserve a port, then free it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let handler = ProxyHandler::new(format!("http://{addr}").parse().unwrap());
        let response = handler.handle().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with(&format!("upstream request to http://{addr}")));
        assert!(text.contains(" failed: "));
        assert!(text.ends_with('\n'));
    }
}
