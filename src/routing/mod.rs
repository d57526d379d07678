//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request URI
//!     → matcher.rs (decode and normalize the path)
//!     → router.rs (prefix classification)
//!     → Return: exactly one RouteKind
//! ```
//!
//! # Design Decisions
//! - The routing table is fixed at compile time
//! - Prefix matching only, no regex
//! - Deterministic: the path alone decides; method, headers and body never do
//! - Static files are the fallback, so classification cannot fail

pub mod matcher;
pub mod router;

pub use matcher::{clean_path, normalize_path, request_path, request_path_bytes};
pub use router::{RouteKind, PROXY_PREFIX, REDIRECT_PREFIX};
