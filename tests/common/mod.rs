//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use edge_router::config::EdgeConfig;
use edge_router::http::EdgeServer;
use edge_router::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock upstream that answers every connection with `raw_head`
/// (status line and headers, without the terminating blank line) and `body`.
pub async fn start_mock_upstream(raw_head: String, body: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let head = raw_head.clone();
            let body = body.clone();
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let response_head = format!(
                    "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    head,
                    body.len()
                );
                let _ = socket.write_all(response_head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start an upstream that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Send `GET <target>` over a raw connection so the target reaches the
/// router byte-for-byte; returns the status code and the body.
#[allow(dead_code)]
pub async fn raw_get(addr: SocketAddr, target: &str) -> (u16, Vec<u8>) {
    let mut socket = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();

    let status = std::str::from_utf8(&response[9..12]).unwrap().parse().unwrap();
    let body_start = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
        .unwrap_or(response.len());
    (status, response[body_start..].to_vec())
}

/// Read until the blank line that ends a request head.
async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
}

/// Configuration pointing at `document_root` and `upstream`, bound to an
/// ephemeral local port.
pub fn test_config(document_root: &Path, upstream: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.static_files.document_root = document_root.to_path_buf();
    config.proxy.upstream_url = format!("http://{upstream}");
    config
}

/// Run the router on an ephemeral port; returns its address and the
/// shutdown handle that stops it.
pub async fn start_router(config: EdgeConfig) -> (SocketAddr, Shutdown) {
    let listener = edge_router::net::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = EdgeServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// A client that neither follows redirects nor uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
