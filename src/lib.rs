//! Scale-to-zero watchdog for HTTP servers.
//!
//! Exits the process when no request has arrived for a configured idle
//! duration, or once it has been serving for a configured maximum age,
//! optionally notifying a shutdown hook first.

pub mod activity;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod watchdog;

pub use activity::ActivityMonitor;
pub use config::{ConfigError, ConfigResolver, NormalizedConfig, RawConfig};
pub use http::HttpServer;
pub use lifecycle::{ShutdownSequence, Terminator};
pub use watchdog::{ScaleToZero, WatchdogOptions};
