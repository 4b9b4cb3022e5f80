//! Shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use paper_generator::config::GeneratorConfig;
use paper_generator::credentials::{KeyStore, StoreOptions};
use paper_generator::resilience::RetryPolicy;
use paper_generator::{GeminiBackend, HttpServer, ModelClient, PaperGenerator, RetryOrchestrator, Shutdown};

/// What the mock provider saw for one request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

/// Start a programmable mock provider on an ephemeral port.
///
/// `f` maps each request to a `(status, body)` reply.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();

    let mut api_key = None;
    let mut content_length = 0usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "x-goog-api-key" => api_key = Some(value.trim().to_string()),
            "content-length" => content_length = value.trim().parse().unwrap_or(0),
            _ => {}
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
    Some(MockRequest { path, api_key, body })
}

/// Wrap structured output the way `generateContent` returns it.
pub fn gemini_reply(output: &Value) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": output.to_string() }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

pub fn gemini_error(code: u16, status: &str, message: &str) -> String {
    json!({ "error": { "code": code, "message": message, "status": status } }).to_string()
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Generator backed by a real Gemini client pointed at `provider`.
pub fn generator_for(provider: SocketAddr, keys: &[&str]) -> (PaperGenerator, Arc<KeyStore>) {
    let store = Arc::new(KeyStore::new(keys.iter().copied(), StoreOptions::default()));
    let policy = RetryPolicy {
        max_tries_per_key: 2,
        base_delay_ms: 10,
        max_delay_ms: 50,
    };
    let orchestrator = Arc::new(RetryOrchestrator::new(store.clone(), policy));
    let base_url = url::Url::parse(&format!("http://{}", provider)).unwrap();
    let backend = Arc::new(GeminiBackend::new(base_url, Duration::from_secs(5)).unwrap());
    let client = ModelClient::new(backend, orchestrator, "gemini-test");
    (PaperGenerator::new(client), store)
}

/// Serve the API on an ephemeral port. Trigger the returned shutdown to stop it.
pub async fn start_api(config: GeneratorConfig, generator: PaperGenerator) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, generator);
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
