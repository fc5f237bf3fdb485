//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Threshold crossed → Notify hook (bounded, best effort) → Terminate
//!
//! Terminate (terminate.rs):
//!     Terminator::terminate → process exits with status 0
//! ```
//!
//! # Design Decisions
//! - Termination is a trait object so tests can observe it
//! - Notification failures are logged, never raised
//! - Startup failures (bad config) are the only non-zero exits

pub mod shutdown;
pub mod terminate;

pub use shutdown::{NotificationError, ShutdownHook, ShutdownSequence, DEFAULT_HOOK_TIMEOUT};
pub use terminate::{ProcessExit, Terminator, EXIT_SUCCESS};
