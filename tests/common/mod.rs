//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use scale_to_zero::config::NormalizedConfig;
use scale_to_zero::{ScaleToZero, Terminator, WatchdogOptions};

/// Terminator that counts calls instead of exiting.
#[derive(Clone, Default)]
pub struct RecordingTerminator {
    calls: Arc<AtomicUsize>,
}

impl RecordingTerminator {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Poll (in real time) until terminate has been called or `limit` passes.
    pub async fn wait(&self, limit: Duration) -> bool {
        let deadline = std::time::Instant::now() + limit;
        while std::time::Instant::now() < deadline {
            if self.count() > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.count() > 0
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn options(terminator: &RecordingTerminator) -> WatchdogOptions {
    WatchdogOptions::default().with_terminator(Arc::new(terminator.clone()))
}

pub fn watchdog(config: NormalizedConfig, terminator: &RecordingTerminator) -> ScaleToZero {
    ScaleToZero::new(config, options(terminator))
}

pub fn thresholds(idle: Option<u64>, max_age: Option<u64>) -> NormalizedConfig {
    NormalizedConfig {
        idle_duration_secs: idle,
        max_age_secs: max_age,
        ..NormalizedConfig::default()
    }
}

/// One request as seen by the mock shutdown hook.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct HookState {
    status: StatusCode,
    delay: Duration,
    tx: mpsc::UnboundedSender<CapturedRequest>,
}

async fn capture(
    State(state): State<HookState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let _ = state.tx.send(CapturedRequest {
        method,
        uri,
        headers,
        body,
    });
    tokio::time::sleep(state.delay).await;
    state.status
}

/// Start a mock shutdown hook on an ephemeral port.
///
/// Every request is forwarded to the returned receiver before the hook
/// waits `delay` and answers with `status`.
pub async fn start_hook_server(
    status: StatusCode,
    delay: Duration,
) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .fallback(capture)
        .with_state(HookState { status, delay, tx });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, rx)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
