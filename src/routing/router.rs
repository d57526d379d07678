//! Route classification.
//!
//! # Responsibilities
//! - Map a normalized path to exactly one RouteKind
//!
//! # Design Decisions
//! - Closed set of routes; adding one is a code change, not a config change
//! - The two prefixes are disjoint, so check order does not matter

use std::fmt;

/// Paths starting with this prefix are answered with a redirect.
pub const REDIRECT_PREFIX: &str = "/redirect/";

/// Paths starting with this prefix are relayed from the upstream.
pub const PROXY_PREFIX: &str = "/proxy/";

/// The handler a request is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    StaticFile,
    Redirect,
    Proxy,
}

impl RouteKind {
    /// Classify an already normalized path.
    pub fn classify(path: &str) -> Self {
        if path.starts_with(REDIRECT_PREFIX) {
            RouteKind::Redirect
        } else if path.starts_with(PROXY_PREFIX) {
            RouteKind::Proxy
        } else {
            RouteKind::StaticFile
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::StaticFile => "static",
            RouteKind::Redirect => "redirect",
            RouteKind::Proxy => "proxy",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
