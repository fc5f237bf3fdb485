//! Configuration schema definitions.
//!
//! `RawConfig` is whatever the host hands us for the plugin namespace.
//! `NormalizedConfig` is the validated, typed result of resolving it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Untyped plugin configuration as supplied by the host.
pub type RawConfig = serde_json::Map<String, serde_json::Value>;

/// Namespace used when the embedding code does not pick one.
pub const DEFAULT_NAMESPACE: &str = "scale-to-zero";

/// Canonical key for the idle threshold.
pub const KEY_DURATION: &str = "duration";
/// Canonical key for the uptime ceiling.
pub const KEY_MAX_AGE: &str = "max_age";
/// Hyphenated spelling of `max_age` still accepted from older configs.
pub const KEY_MAX_AGE_LEGACY: &str = "max-age";
pub const KEY_SHUTDOWN_URL: &str = "shutdown_url";
pub const KEY_SHUTDOWN_HEADERS: &str = "shutdown_headers";
pub const KEY_SHUTDOWN_METHOD: &str = "shutdown_method";
pub const KEY_SHUTDOWN_BODY: &str = "shutdown_body";

/// Every key a plugin mapping may contain once the legacy alias is rewritten.
pub const RECOGNIZED_KEYS: [&str; 6] = [
    KEY_DURATION,
    KEY_MAX_AGE,
    KEY_SHUTDOWN_URL,
    KEY_SHUTDOWN_HEADERS,
    KEY_SHUTDOWN_METHOD,
    KEY_SHUTDOWN_BODY,
];

/// Validated watchdog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedConfig {
    /// Exit when no traffic has been seen for this many seconds.
    pub idle_duration_secs: Option<u64>,

    /// Exit when the watchdog has been running for this many seconds.
    pub max_age_secs: Option<u64>,

    /// Target of the pre-exit notification. `None` disables the hook.
    pub shutdown_url: Option<String>,

    /// HTTP verb used for the notification.
    pub shutdown_method: ShutdownMethod,

    /// Extra request headers for the notification.
    pub shutdown_headers: BTreeMap<String, String>,

    /// Request body for the notification. Never `Some("")`.
    pub shutdown_body: Option<String>,
}

impl NormalizedConfig {
    /// True when neither threshold is configured; the watchdog never runs.
    pub fn is_inert(&self) -> bool {
        self.idle_duration_secs.is_none() && self.max_age_secs.is_none()
    }

    pub fn idle_duration(&self) -> Option<Duration> {
        self.idle_duration_secs.map(Duration::from_secs)
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_secs.map(Duration::from_secs)
    }
}

/// HTTP verbs accepted for the shutdown hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShutdownMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl ShutdownMethod {
    pub const ALL: [ShutdownMethod; 5] = [
        ShutdownMethod::Get,
        ShutdownMethod::Post,
        ShutdownMethod::Put,
        ShutdownMethod::Delete,
        ShutdownMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownMethod::Get => "GET",
            ShutdownMethod::Post => "POST",
            ShutdownMethod::Put => "PUT",
            ShutdownMethod::Delete => "DELETE",
            ShutdownMethod::Patch => "PATCH",
        }
    }

    /// The equivalent `reqwest` method.
    pub fn to_http(self) -> reqwest::Method {
        match self {
            ShutdownMethod::Get => reqwest::Method::GET,
            ShutdownMethod::Post => reqwest::Method::POST,
            ShutdownMethod::Put => reqwest::Method::PUT,
            ShutdownMethod::Delete => reqwest::Method::DELETE,
            ShutdownMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for ShutdownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only the uppercase spellings parse.
impl FromStr for ShutdownMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_is_case_sensitive() {
        assert_eq!("PATCH".parse::<ShutdownMethod>(), Ok(ShutdownMethod::Patch));
        assert!("post".parse::<ShutdownMethod>().is_err());
        assert!("HEAD".parse::<ShutdownMethod>().is_err());
    }

    #[test]
    fn inert_only_without_both_thresholds() {
        let mut config = NormalizedConfig::default();
        assert!(config.is_inert());

        config.max_age_secs = Some(5);
        assert!(!config.is_inert());
        assert_eq!(config.max_age(), Some(Duration::from_secs(5)));
        assert_eq!(config.idle_duration(), None);
    }
}
