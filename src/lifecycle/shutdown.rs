//! Shutdown sequence: optional notification, then unconditional exit.
//!
//! # Responsibilities
//! - Send one request to the configured shutdown hook
//! - Log (never propagate) anything that goes wrong with it
//! - Always call the terminator afterwards
//!
//! # Design Decisions
//! - Bounded by a timeout so a hung endpoint cannot keep the process alive
//! - No retries: a failed notification is logged and the exit proceeds
//! - Panics in the notification step are caught so termination still runs

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use thiserror::Error;
use tokio::time;

use crate::config::{NormalizedConfig, ShutdownMethod};
use crate::lifecycle::terminate::Terminator;

/// Default upper bound on the whole notification request.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("scale-to-zero/", env!("CARGO_PKG_VERSION"));

/// Anything that can go wrong while contacting the shutdown hook.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid shutdown header {name:?}")]
    InvalidHeader { name: String },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("hook returned non-success status {0}")]
    Status(StatusCode),

    #[error("notification panicked")]
    Panicked,
}

/// Parameters of the pre-exit notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownHook {
    pub url: String,
    pub method: ShutdownMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl ShutdownHook {
    /// `None` when no URL is configured.
    pub fn from_config(config: &NormalizedConfig) -> Option<Self> {
        let url = config.shutdown_url.clone()?;
        Some(Self {
            url,
            method: config.shutdown_method,
            headers: config.shutdown_headers.clone(),
            body: config.shutdown_body.clone(),
        })
    }

    fn header_map(&self) -> Result<HeaderMap, NotificationError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let invalid = || NotificationError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.append(header_name, header_value);
        }
        Ok(headers)
    }
}

/// Notify-then-exit sequence run once by the watchdog.
pub struct ShutdownSequence {
    hook: Option<ShutdownHook>,
    timeout: Duration,
    terminator: Arc<dyn Terminator>,
}

impl ShutdownSequence {
    pub fn new(
        hook: Option<ShutdownHook>,
        timeout: Duration,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self {
            hook,
            timeout,
            terminator,
        }
    }

    pub fn from_config(
        config: &NormalizedConfig,
        timeout: Duration,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self::new(ShutdownHook::from_config(config), timeout, terminator)
    }

    pub fn hook(&self) -> Option<&ShutdownHook> {
        self.hook.as_ref()
    }

    /// Notify the hook (if any) and terminate.
    ///
    /// Only returns when the terminator does.
    pub async fn execute(&self) {
        if let Some(hook) = &self.hook {
            let outcome = AssertUnwindSafe(self.notify(hook))
                .catch_unwind()
                .await
                .unwrap_or(Err(NotificationError::Panicked));

            match outcome {
                Ok(status) => {
                    tracing::info!(
                        url = %hook.url,
                        method = %hook.method,
                        status = %status,
                        "Shutdown hook notified"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        url = %hook.url,
                        method = %hook.method,
                        error = %e,
                        "Shutdown hook failed"
                    );
                }
            }
        }

        self.terminator.terminate();
    }

    /// Send the notification request once.
    pub async fn notify(&self, hook: &ShutdownHook) -> Result<StatusCode, NotificationError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(NotificationError::Client)?;

        let mut request = client.request(hook.method.to_http(), &hook.url);
        if !hook.headers.is_empty() {
            request = request.headers(hook.header_map()?);
        }
        if let Some(body) = hook.body.as_ref().filter(|body| !body.is_empty()) {
            request = request.body(body.clone());
        }

        let response = match time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(NotificationError::Request(e)),
            Err(_) => return Err(NotificationError::Timeout(self.timeout)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status(status));
        }
        Ok(status)
    }
}
