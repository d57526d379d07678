//! Fixed-target redirect.
//!
//! Every request is answered with `302 Found` and the same `Location`,
//! whatever its path suffix, method or body.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
};

/// Answers every request with a redirect to one target.
#[derive(Debug, Clone)]
pub struct RedirectHandler {
    location: HeaderValue,
    html_body: String,
}

impl RedirectHandler {
    /// Create a handler for `target`.
    ///
    /// `target` must be a valid header value; config validation checks
    /// this before startup.
    pub fn new(target: &str) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            location: HeaderValue::from_str(target)?,
            html_body: format!("<a href=\"{}\">Found</a>.\n", html_escape(target)),
        })
    }

    pub fn location(&self) -> &HeaderValue {
        &self.location
    }

    pub fn handle(&self, method: &Method) -> Response {
        tracing::info!(
            status = StatusCode::FOUND.as_u16(),
            location = ?self.location,
            "Redirecting"
        );

        // GET gets a short hypertext note for clients that ignore Location;
        // HEAD advertises the same content type without the body.
        let mut response = match *method {
            Method::GET => Response::new(Body::from(self.html_body.clone())),
            _ => Response::new(Body::empty()),
        };
        if matches!(*method, Method::GET | Method::HEAD) {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
        }

        *response.status_mut() = StatusCode::FOUND;
        response
            .headers_mut()
            .insert(header::LOCATION, self.location.clone());
        response
    }
}

/// Escape the characters that are significant inside an HTML attribute.
pub(crate) fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
