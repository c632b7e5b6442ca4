#![allow(dead_code)]

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Router;
use star_count_fetcher::{FetcherConfig, StarCountFetcher};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// A request as seen by the fake API.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub user_agent: Option<String>,
}

/// Local stand-in for the GitHub API, bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serves `make_response()` for every request, recording each one.
    pub async fn start<F>(make_response: F) -> anyhow::Result<Self>
    where
        F: Fn() -> Response + Clone + Send + Sync + 'static,
    {
        Self::start_with_delay(Duration::ZERO, make_response).await
    }

    /// Like `start`, but waits `delay` before sending response headers.
    pub async fn start_with_delay<F>(delay: Duration, make_response: F) -> anyhow::Result<Self>
    where
        F: Fn() -> Response + Clone + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let app = Router::new().fallback(move |req: Request| {
            let recorder = recorder.clone();
            let make_response = make_response.clone();
            async move {
                let user_agent = req
                    .headers()
                    .get(header::USER_AGENT)
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push(SeenRequest {
                    path: req.uri().path().to_string(),
                    user_agent,
                });
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                make_response()
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(TestServer { addr, seen, handle })
    }

    /// Serves a fixed status and body.
    pub async fn respond(status: StatusCode, body: &'static str) -> anyhow::Result<Self> {
        Self::start(move || json_response(status, Body::from(body))).await
    }

    pub fn config(&self) -> FetcherConfig {
        FetcherConfig::default()
            .with_api_root(&format!("http://{}", self.addr))
            .expect("test server address is a valid URL")
    }

    pub fn fetcher(&self) -> StarCountFetcher {
        StarCountFetcher::new(self.config()).expect("Failed to create fetcher")
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn json_response(status: StatusCode, body: Body) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

/// An address nothing is listening on.
pub async fn closed_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Collects formatted log output from the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Installs a thread-local subscriber; logging stops when the guard drops.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Lines emitted by this crate at `level` ("INFO", "WARN", ...).
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .filter(|line| line.contains("star_count_fetcher"))
            .filter(|line| line.split_whitespace().any(|word| word == level))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
