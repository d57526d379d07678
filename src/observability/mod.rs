//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / handlers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Logging never influences routing or responses
//! - Request ID flows through every log line via TraceLayer spans
//! - Metrics are recorded even when no exporter is installed (no-op)

pub mod logging;
pub mod metrics;
