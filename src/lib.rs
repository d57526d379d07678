//! Edge Router Library
//!
//! Dispatches every request by path prefix to one of three handlers:
//! `/redirect/*` → fixed redirect, `/proxy/*` → fixed upstream,
//! anything else → static files from the document root.

pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::EdgeConfig;
pub use http::EdgeServer;
pub use lifecycle::Shutdown;
pub use routing::RouteKind;
