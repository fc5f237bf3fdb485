//! HTTP glue between the host server and the watchdog.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → middleware/activity.rs (record request, lazily start watchdog)
//!     → host handlers, unchanged
//! ```

pub mod middleware;
pub mod server;

pub use middleware::track_activity;
pub use server::HttpServer;
