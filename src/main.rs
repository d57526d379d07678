//! Edge Router
//!
//! A minimal HTTP edge router built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!  client ──▶ net::listener ──▶ http::server ──▶ routing::classify
//!                                                      │
//!                  ┌───────────────────────┬───────────┴──────────┐
//!                  ▼                       ▼                      ▼
//!        handler::static_files     handler::redirect       handler::proxy ──▶ upstream
//!        (document root)           (302, fixed target)     (GET, relay as-is)
//!
//!  cross-cutting: config · observability · lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_router::config::{read_config, validate_config, EdgeConfig};
use edge_router::http::EdgeServer;
use edge_router::lifecycle::{wait_for_signal, Shutdown};
use edge_router::{net, observability};

#[derive(Parser, Debug)]
#[command(name = "edge-router")]
#[command(about = "Route requests to static files, a fixed redirect or a fixed upstream", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory static files are served from.
    #[arg(short, long)]
    document_root: Option<PathBuf>,

    /// Upstream URL fetched for /proxy/ requests.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Location sent for /redirect/ requests.
    #[arg(short, long)]
    redirect_target: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut EdgeConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(root) = self.document_root {
            config.static_files.document_root = root;
        }
        if let Some(upstream) = self.upstream {
            config.proxy.upstream_url = upstream;
        }
        if let Some(target) = self.redirect_target {
            config.redirect.target = target;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let mut config = match cli.config.take() {
        Some(path) => read_config(&path)?,
        None => EdgeConfig::default(),
    };
    cli.apply(&mut config);

    observability::logging::init(&config.observability)?;
    tracing::info!("edge-router v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        }
    }

    let listener = net::bind(&config.listener).await?;
    let server = EdgeServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
