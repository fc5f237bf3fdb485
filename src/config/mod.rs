//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host config (TOML file, or any mapping the host provides)
//!     → loader.rs (extract [plugins.<namespace>] as RawConfig)
//!     → resolver.rs (key normalisation, unknown-key rejection, field checks)
//!     → duration.rs ("10m" → 600)
//!     → NormalizedConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Resolution is a pure function; startup calls it once to fail fast
//! - Every failure has its own stable message
//! - Unknown keys are an error, never ignored

pub mod duration;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod schema;

pub use error::ConfigError;
pub use loader::{load_plugin_config, LoadError};
pub use resolver::ConfigResolver;
pub use schema::{NormalizedConfig, RawConfig, ShutdownMethod, DEFAULT_NAMESPACE};
