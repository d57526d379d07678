//! Request handlers, one per RouteKind.
//!
//! # Data Flow
//! ```text
//! dispatcher (http/server.rs)
//!     ├─ RouteKind::StaticFile → static_files.rs (document root)
//!     ├─ RouteKind::Redirect   → redirect.rs (fixed Location)
//!     └─ RouteKind::Proxy      → proxy.rs (fixed upstream GET)
//! ```
//!
//! # Design Decisions
//! - Handlers are built once at startup and never mutated
//! - Handlers never call one another
//! - Every handler produces a complete response; failures are request-scoped

pub mod proxy;
pub mod redirect;
pub mod static_files;

pub use proxy::{ProxyError, ProxyHandler};
pub use redirect::RedirectHandler;
pub use static_files::{StaticFileError, StaticFileHandler, FORBIDDEN_PATH};
