//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Build the handlers from configuration
//! - Create the axum Router with a single catch-all dispatcher
//! - Wire up middleware (tracing, request ID, optional timeout)
//! - Serve a listener until shutdown is signalled

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderValue, uri::InvalidUri, Request, Uri},
    response::Response,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::EdgeConfig;
use crate::handler::{ProxyHandler, RedirectHandler, StaticFileHandler};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::observability::metrics;
use crate::routing::{request_path, RouteKind};

/// Errors raised while building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid redirect target: {0}")]
    RedirectTarget(#[from] InvalidHeaderValue),

    #[error("invalid upstream URL: {0}")]
    UpstreamUrl(#[from] InvalidUri),
}

/// Application state injected into the dispatcher.
#[derive(Clone, Debug)]
pub struct AppState {
    pub static_files: Arc<StaticFileHandler>,
    pub redirect: Arc<RedirectHandler>,
    pub proxy: Arc<ProxyHandler>,
}

impl AppState {
    pub fn from_config(config: &EdgeConfig) -> Result<Self, ServerError> {
        let upstream: Uri = config.proxy.upstream_url.parse()?;
        Ok(Self {
            static_files: Arc::new(StaticFileHandler::new(
                config.static_files.document_root.clone(),
            )),
            redirect: Arc::new(RedirectHandler::new(&config.redirect.target)?),
            proxy: Arc::new(ProxyHandler::new(upstream)),
        })
    }
}

/// HTTP server for the edge router.
pub struct EdgeServer {
    router: Router,
    config: EdgeConfig,
}

impl EdgeServer {
    /// Create a new server from a validated configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(state, config.timeouts.request_timeout());
        Ok(Self { router, config })
    }

    /// Build the axum router with all middleware layers.
    ///
    /// Every path and method reaches [`dispatch`] through the fallback.
    #[allow(deprecated)]
    pub fn build_router(state: AppState, request_timeout: Option<Duration>) -> Router {
        let router = Router::new().fallback(dispatch).with_state(state);

        let router = match request_timeout {
            Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
            None => router,
        };

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Serve connections from `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            document_root = %self.config.static_files.document_root.display(),
            redirect_target = %self.config.redirect.target,
            upstream = %self.config.proxy.upstream_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Classify the request path and invoke exactly one handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let path = request_path(request.uri());
    let route = RouteKind::classify(&path);
    let method = request.method().clone();

    tracing::info!(
        request_id = %request_id(&request),
        method = %method,
        path = %path,
        route = %route,
        "Request path"
    );

    let response = match route {
        RouteKind::StaticFile => state.static_files.handle(request).await,
        RouteKind::Redirect => state.redirect.handle(&method),
        RouteKind::Proxy => state.proxy.handle().await,
    };

    metrics::record_request(route, &method, response.status(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    /// A local address with nothing listening on it.
    fn unused_addr() -> std::net::SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    }

    fn router_for(root: &std::path::Path) -> Router {
        let mut config = EdgeConfig::default();
        config.static_files.document_root = root.to_path_buf();
        config.proxy.upstream_url = format!("http://{}", unused_addr());
        EdgeServer::new(config).unwrap().router()
    }

    async fn send(router: Router, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_redirect_ignores_suffix_and_method() {
        let dir = tempfile::tempdir().unwrap();
        for (method, uri) in [
            (Method::GET, "/redirect/anything"),
            (Method::POST, "/redirect/"),
            (Method::PUT, "/redirect/a/b/c?q=1"),
        ] {
            let response = send(router_for(dir.path()), method, uri).await;
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(response.headers()[header::LOCATION], "https://go.dev");
        }
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "hi").unwrap();
        std::fs::write(dir.path().join("redirect"), "a file named redirect").unwrap();

        let response = send(router_for(dir.path()), Method::GET, "/index.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"hi");

        // Without the trailing slash the prefix does not match.
        let response = send(router_for(dir.path()), Method::GET, "/redirect").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forbidden_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("forbidden.txt"), "secret").unwrap();

        for uri in ["/forbidden.txt", "//forbidden.txt", "/a/../forbidden.txt"] {
            let response = send(router_for(dir.path()), Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_proxy_with_upstream_down() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(router_for(dir.path()), Method::POST, "/proxy/anything").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_every_response_has_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(router_for(dir.path()), Method::GET, "/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));

        let request = Request::builder()
            .uri("/redirect/x")
            .header("x-request-id", "client-chosen")
            .body(Body::empty())
            .unwrap();
        let response = router_for(dir.path()).oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "client-chosen");
    }

    #[test]
    fn test_state_from_config() {
        let mut config = EdgeConfig::default();
        config.static_files.document_root = "/var/www".into();
        config.redirect.target = "https://example.org/".into();

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.static_files.document_root(), std::path::Path::new("/var/www"));
        assert_eq!(state.redirect.location().to_str().unwrap(), "https://example.org/");
        assert_eq!(state.proxy.upstream().authority().unwrap().as_str(), "localhost:8081");
    }

    #[test]
    fn test_invalid_upstream_rejected() {
        let mut config = EdgeConfig::default();
        config.proxy.upstream_url = "http://bad host".into();
        assert!(matches!(
            EdgeServer::new(config),
            Err(ServerError::UpstreamUrl(_))
        ));
    }
}
