//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use diag_service::config::DiagConfig;
use diag_service::lifecycle::{self, RunningService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Config bound to an ephemeral loopback port.
pub fn local_config() -> DiagConfig {
    let mut config = DiagConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// Config with a scan timeout generous enough for loaded test machines.
#[allow(dead_code)]
pub fn relaxed_config() -> DiagConfig {
    let mut config = local_config();
    config.scan.timeout_ms = 5_000;
    config
}

pub async fn start_service(config: DiagConfig) -> RunningService {
    lifecycle::start(config).await.expect("service failed to start")
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Open a raw connection and send a request head announcing
/// `content_length` bytes, followed by `body_prefix`.
#[allow(dead_code)]
pub async fn open_stalled_request(
    addr: SocketAddr,
    content_length: usize,
    body_prefix: &[u8],
) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "POST /log/ HTTP/1.1\r\nHost: {addr}\r\nContent-Length: {content_length}\r\n\r\n"
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body_prefix).await.unwrap();
    stream.flush().await.unwrap();
    stream
}

/// Read from `stream` until `needle` shows up or the connection closes.
#[allow(dead_code)]
pub async fn read_until(stream: &mut TcpStream, needle: &str, limit: Duration) -> String {
    let read = async {
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if String::from_utf8_lossy(&received).contains(needle) {
                break;
            }
        }
        String::from_utf8_lossy(&received).into_owned()
    };
    tokio::time::timeout(limit, read)
        .await
        .expect("no response within limit")
}

/// Poll until the service reports `expected` running handlers.
#[allow(dead_code)]
pub async fn wait_for_in_flight(service: &RunningService, expected: u64, limit: Duration) {
    let poll = async {
        while service.in_flight() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    if tokio::time::timeout(limit, poll).await.is_err() {
        panic!(
            "in-flight count stuck at {} (expected {expected})",
            service.in_flight()
        );
    }
}
