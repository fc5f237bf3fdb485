//! Last-activity tracking.
//!
//! # Responsibilities
//! - Remember when the most recent unit of traffic was seen
//! - Report idle time relative to a caller-supplied clock reading
//!
//! # Design Decisions
//! - One `AtomicU64` holding nanoseconds since the monitor's origin, offset by
//!   one so that zero means "never"
//! - Relaxed ordering: a stale read delays detection by at most one poll

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

const NEVER: u64 = 0;

/// Lock-free cell holding the timestamp of the latest request.
#[derive(Debug)]
pub struct ActivityMonitor {
    origin: Instant,
    last_activity: AtomicU64,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::with_origin(Instant::now())
    }

    /// Timestamps earlier than `origin` are clamped to it.
    pub fn with_origin(origin: Instant) -> Self {
        Self {
            origin,
            last_activity: AtomicU64::new(NEVER),
        }
    }

    /// Overwrite the last-activity timestamp.
    pub fn record_activity(&self, now: Instant) {
        let offset = now.saturating_duration_since(self.origin).as_nanos();
        let encoded = u64::try_from(offset).unwrap_or(u64::MAX - 1) + 1;
        self.last_activity.store(encoded, Ordering::Relaxed);
    }

    pub fn last_activity_at(&self) -> Option<Instant> {
        match self.last_activity.load(Ordering::Relaxed) {
            NEVER => None,
            encoded => Some(self.origin + Duration::from_nanos(encoded - 1)),
        }
    }

    /// Time since the last recorded activity, or `None` before the first one.
    pub fn idle_time(&self, now: Instant) -> Option<Duration> {
        self.last_activity_at()
            .map(|last| now.saturating_duration_since(last))
    }
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
