//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! watchdog, shutdown sequence, HTTP glue
//!     → tracing events (structured fields)
//!     → logging.rs subscriber (stdout)
//! ```

pub mod logging;

pub use logging::init_logging;
