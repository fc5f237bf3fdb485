//! Watchdog lifecycle state.
//!
//! # States
//! - Dormant: no traffic seen yet (or both thresholds absent, forever)
//! - Running: polling loop spawned on the first request
//! - ShuttingDown: a threshold was crossed and the shutdown sequence ran
//!
//! # State Transitions
//! ```text
//! Dormant → Running: first recorded request (exactly once)
//! Running → ShuttingDown: threshold crossed (exactly once)
//! ```
//! There is no way back to Dormant.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use serde::Serialize;
use tokio::time::Instant;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogPhase {
    Dormant = 0,
    Running = 1,
    ShuttingDown = 2,
}

impl From<u8> for WatchdogPhase {
    fn from(val: u8) -> Self {
        match val {
            1 => WatchdogPhase::Running,
            2 => WatchdogPhase::ShuttingDown,
            _ => WatchdogPhase::Dormant,
        }
    }
}

/// One-time start guard plus the instant the loop began.
#[derive(Debug, Default)]
pub struct WatchdogState {
    phase: AtomicU8,
    started_at: OnceLock<Instant>,
}

impl WatchdogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WatchdogPhase {
        self.phase.load(Ordering::Acquire).into()
    }

    /// Move Dormant → Running. Returns `true` for exactly one caller.
    pub fn try_start(&self, now: Instant) -> bool {
        let won = self
            .phase
            .compare_exchange(
                WatchdogPhase::Dormant as u8,
                WatchdogPhase::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            let _ = self.started_at.set(now);
        }
        won
    }

    /// Move Running → ShuttingDown. Returns `true` for exactly one caller.
    pub fn begin_shutdown(&self) -> bool {
        self.phase
            .compare_exchange(
                WatchdogPhase::Running as u8,
                WatchdogPhase::ShuttingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get().copied()
    }
}
