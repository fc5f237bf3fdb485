//! Periodic threshold checks.
//!
//! # Responsibilities
//! - Wake on a fixed interval (1s by default)
//! - Compare idle time and uptime against the configured thresholds
//! - Run the shutdown sequence once when either is exceeded, then stop
//!
//! # Design Decisions
//! - `tokio::time::interval` with `Delay`: checks never overlap and never burst
//! - Uptime is measured from loop start (first request), not process boot
//! - No idle evaluation until a request has been recorded

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::activity::ActivityMonitor;
use crate::config::NormalizedConfig;
use crate::lifecycle::ShutdownSequence;
use crate::watchdog::state::WatchdogState;

/// Default time between checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Limits the loop enforces. Either alone is enough to trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Thresholds {
    pub idle: Option<Duration>,
    pub max_age: Option<Duration>,
}

impl Thresholds {
    pub fn from_config(config: &NormalizedConfig) -> Self {
        Self {
            idle: config.idle_duration(),
            max_age: config.max_age(),
        }
    }

    /// Which threshold, if any, has been exceeded (strictly greater than).
    pub fn evaluate(&self, idle: Option<Duration>, uptime: Duration) -> Option<TerminationReason> {
        if let (Some(limit), Some(idle)) = (self.idle, idle) {
            if idle > limit {
                return Some(TerminationReason::Idle { idle, limit });
            }
        }
        if let Some(limit) = self.max_age {
            if uptime > limit {
                return Some(TerminationReason::MaxAge { uptime, limit });
            }
        }
        None
    }
}

/// Why the watchdog decided to stop the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    Idle { idle: Duration, limit: Duration },
    MaxAge { uptime: Duration, limit: Duration },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Idle { idle, limit } => write!(
                f,
                "no traffic for {}s (limit {}s)",
                idle.as_secs(),
                limit.as_secs()
            ),
            TerminationReason::MaxAge { uptime, limit } => write!(
                f,
                "running for {}s (max age {}s)",
                uptime.as_secs(),
                limit.as_secs()
            ),
        }
    }
}

/// Background task that polls until a threshold is crossed.
pub struct WatchdogLoop {
    thresholds: Thresholds,
    activity: Arc<ActivityMonitor>,
    state: Arc<WatchdogState>,
    started_at: Instant,
    interval: Duration,
    shutdown: ShutdownSequence,
}

impl WatchdogLoop {
    pub fn new(
        thresholds: Thresholds,
        activity: Arc<ActivityMonitor>,
        state: Arc<WatchdogState>,
        started_at: Instant,
        interval: Duration,
        shutdown: ShutdownSequence,
    ) -> Self {
        Self {
            thresholds,
            activity,
            state,
            started_at,
            interval,
            shutdown,
        }
    }

    /// One check at `now`.
    pub fn check(&self, now: Instant) -> Option<TerminationReason> {
        let idle = self.activity.idle_time(now);
        let uptime = now.saturating_duration_since(self.started_at);
        self.thresholds.evaluate(idle, uptime)
    }

    /// Poll until a threshold is crossed, then run the shutdown sequence.
    pub async fn run(self) {
        tracing::info!(
            idle_secs = ?self.thresholds.idle.map(|d| d.as_secs()),
            max_age_secs = ?self.thresholds.max_age.map(|d| d.as_secs()),
            interval_ms = self.interval.as_millis() as u64,
            "Scale-to-zero watchdog started"
        );

        let mut ticker = time::interval_at(self.started_at + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(reason) = self.check(Instant::now()) else {
                continue;
            };

            if !self.state.begin_shutdown() {
                return;
            }

            tracing::info!(reason = %reason, "Watchdog threshold crossed, shutting down");
            self.shutdown.execute().await;

            // Only reachable when the terminator returns.
            tracing::debug!("Watchdog stopped");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    fn thresholds(idle: Option<u64>, max_age: Option<u64>) -> Thresholds {
        Thresholds {
            idle: idle.map(Duration::from_secs),
            max_age: max_age.map(Duration::from_secs),
        }
    }

    #[test]
    fn idle_must_strictly_exceed_limit() {
        let t = thresholds(Some(1), None);
        assert_eq!(t.evaluate(Some(SEC), 10 * SEC), None);
        assert_eq!(
            t.evaluate(Some(2 * SEC), 10 * SEC),
            Some(TerminationReason::Idle { idle: 2 * SEC, limit: SEC })
        );
    }

    #[test]
    fn no_activity_skips_idle_check() {
        let t = thresholds(Some(1), None);
        assert_eq!(t.evaluate(None, 3600 * SEC), None);
    }

    #[test]
    fn max_age_ignores_traffic() {
        let t = thresholds(None, Some(1));
        assert_eq!(
            t.evaluate(Some(Duration::ZERO), 2 * SEC),
            Some(TerminationReason::MaxAge { uptime: 2 * SEC, limit: SEC })
        );
        assert_eq!(t.evaluate(None, SEC), None);
    }

    #[test]
    fn either_threshold_is_enough() {
        let t = thresholds(Some(10), Some(100));
        assert!(t.evaluate(Some(11 * SEC), SEC).is_some());
        assert!(t.evaluate(Some(SEC), 101 * SEC).is_some());
        assert!(t.evaluate(Some(SEC), SEC).is_none());
    }

    #[test]
    fn no_thresholds_never_trigger() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate(Some(3600 * SEC), 3600 * SEC), None);
    }

    #[test]
    fn reason_display() {
        let idle = TerminationReason::Idle { idle: 61 * SEC, limit: 60 * SEC };
        assert_eq!(idle.to_string(), "no traffic for 61s (limit 60s)");
        let age = TerminationReason::MaxAge { uptime: 7201 * SEC, limit: 7200 * SEC };
        assert_eq!(age.to_string(), "running for 7201s (max age 7200s)");
    }
}
