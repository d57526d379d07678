//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and URLs parse into the types the server needs
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderValue, Uri};
use thiserror::Error;

use crate::config::schema::EdgeConfig;

/// A single violated configuration rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("static_files.document_root must not be empty")]
    EmptyDocumentRoot,

    #[error("redirect.target '{0}' is not an absolute URL")]
    RedirectTarget(String),

    #[error("proxy.upstream_url '{url}': {reason}")]
    UpstreamUrl { url: String, reason: &'static str },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.static_files.document_root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDocumentRoot);
    }

    let target = &config.redirect.target;
    let target_ok = url::Url::parse(target).is_ok() && HeaderValue::from_str(target).is_ok();
    if !target_ok {
        errors.push(ValidationError::RedirectTarget(target.clone()));
    }

    if let Err(reason) = check_upstream(&config.proxy.upstream_url) {
        errors.push(ValidationError::UpstreamUrl {
            url: config.proxy.upstream_url.clone(),
            reason,
        });
    }

    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream(raw: &str) -> Result<(), &'static str> {
    let uri: Uri = raw.parse().map_err(|_| "not a valid URI")?;
    match uri.scheme_str() {
        Some("http") => {}
        Some(_) => return Err("only plain http upstreams are supported"),
        None => return Err("missing scheme"),
    }
    if uri.authority().is_none() {
        return Err("missing host");
    }
    Ok(())
}
