//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig.bind_address
//!     → listener.rs (parse, bind)
//!     → tokio TcpListener handed to axum::serve
//! ```
//!
//! # Design Decisions
//! - Plain TCP only; no TLS
//! - A bind failure is the one process-fatal error

pub mod listener;

pub use listener::{bind, ListenerError};
