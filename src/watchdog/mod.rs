//! Scale-to-zero watchdog.
//!
//! # Data Flow
//! ```text
//! every request
//!     → ScaleToZero::record_request
//!         → WatchdogState::try_start (first request only → spawn WatchdogLoop)
//!         → ActivityMonitor::record_activity
//!
//! WatchdogLoop (every check interval)
//!     → idle time + uptime vs Thresholds
//!     → ShutdownSequence::execute (once)
//! ```
//!
//! # Design Decisions
//! - One context object, built at startup and cloned into the middleware
//! - Inert configs never spawn, log or allocate a task
//! - Time before the first request is neither idle time nor uptime

pub mod runner;
pub mod state;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::activity::ActivityMonitor;
use crate::config::{ConfigError, ConfigResolver, NormalizedConfig, RawConfig, DEFAULT_NAMESPACE};
use crate::lifecycle::{ProcessExit, ShutdownSequence, Terminator, DEFAULT_HOOK_TIMEOUT};

pub use runner::{TerminationReason, Thresholds, WatchdogLoop, DEFAULT_CHECK_INTERVAL};
pub use state::{WatchdogPhase, WatchdogState};

/// Settings supplied by the embedding code rather than the plugin mapping.
#[derive(Clone)]
pub struct WatchdogOptions {
    /// Namespace reported in configuration errors.
    pub namespace: String,
    /// Time between threshold checks. Must be non-zero.
    pub check_interval: Duration,
    /// Upper bound on the shutdown-hook request.
    pub hook_timeout: Duration,
    pub terminator: Arc<dyn Terminator>,
}

impl WatchdogOptions {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = timeout;
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }
}

impl Default for WatchdogOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
            terminator: Arc::new(ProcessExit),
        }
    }
}

impl fmt::Debug for WatchdogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchdogOptions")
            .field("namespace", &self.namespace)
            .field("check_interval", &self.check_interval)
            .field("hook_timeout", &self.hook_timeout)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of the watchdog, for logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchdogStatus {
    pub phase: WatchdogPhase,
    pub idle_duration_secs: Option<u64>,
    pub max_age_secs: Option<u64>,
    pub idle_secs: Option<u64>,
    pub uptime_secs: Option<u64>,
}

/// Per-process watchdog context, shared by the middleware and the loop.
#[derive(Clone)]
pub struct ScaleToZero {
    inner: Arc<Inner>,
}

struct Inner {
    config: NormalizedConfig,
    activity: Arc<ActivityMonitor>,
    state: Arc<WatchdogState>,
    options: WatchdogOptions,
}

impl ScaleToZero {
    /// Startup hook: validate the raw plugin mapping and build the context.
    pub fn startup(raw: &RawConfig, options: WatchdogOptions) -> Result<Self, ConfigError> {
        let config = ConfigResolver::new(options.namespace.clone()).resolve(raw)?;
        Ok(Self::new(config, options))
    }

    pub fn new(config: NormalizedConfig, options: WatchdogOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                activity: Arc::new(ActivityMonitor::new()),
                state: Arc::new(WatchdogState::new()),
                options,
            }),
        }
    }

    pub fn config(&self) -> &NormalizedConfig {
        &self.inner.config
    }

    pub fn is_inert(&self) -> bool {
        self.inner.config.is_inert()
    }

    pub fn phase(&self) -> WatchdogPhase {
        self.inner.state.phase()
    }

    pub fn activity(&self) -> &ActivityMonitor {
        &self.inner.activity
    }

    /// Record one unit of traffic now. Must run inside a Tokio runtime.
    pub fn record_request(&self) {
        self.record_request_at(Instant::now());
    }

    /// Start the loop on the first call, then record activity at `now`.
    pub fn record_request_at(&self, now: Instant) {
        if self.is_inert() {
            return;
        }
        if self.inner.state.try_start(now) {
            self.spawn_loop(now);
        }
        self.inner.activity.record_activity(now);
    }

    fn spawn_loop(&self, started_at: Instant) {
        let inner = &self.inner;
        let shutdown = ShutdownSequence::from_config(
            &inner.config,
            inner.options.hook_timeout,
            inner.options.terminator.clone(),
        );
        let watchdog = WatchdogLoop::new(
            Thresholds::from_config(&inner.config),
            inner.activity.clone(),
            inner.state.clone(),
            started_at,
            inner.options.check_interval.max(Duration::from_millis(1)),
            shutdown,
        );
        tokio::spawn(watchdog.run());
    }

    pub fn status(&self, now: Instant) -> WatchdogStatus {
        let inner = &self.inner;
        WatchdogStatus {
            phase: inner.state.phase(),
            idle_duration_secs: inner.config.idle_duration_secs,
            max_age_secs: inner.config.max_age_secs,
            idle_secs: inner.activity.idle_time(now).map(|d| d.as_secs()),
            uptime_secs: inner
                .state
                .started_at()
                .map(|started| now.saturating_duration_since(started).as_secs()),
        }
    }
}

impl fmt::Debug for ScaleToZero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleToZero")
            .field("config", &self.inner.config)
            .field("phase", &self.phase())
            .field("options", &self.inner.options)
            .finish()
    }
}
