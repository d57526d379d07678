//! Response construction helpers.
//!
//! # Responsibilities
//! - Build plain-text error responses shared by all handlers
//! - Map handler errors to HTTP status codes (see `IntoResponse` impls
//!   next to each error type)
//!
//! # Design Decisions
//! - Error bodies are newline-terminated text with `nosniff`
//! - Proxied responses never pass through here; they are relayed as-is

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A `text/plain` response with the given status and message.
pub fn text_error(status: StatusCode, message: &str) -> Response {
    let mut response = Response::new(Body::from(format!("{message}\n")));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
