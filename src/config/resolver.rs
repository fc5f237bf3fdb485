//! Raw plugin mapping → `NormalizedConfig`.
//!
//! # Rules (applied in order)
//! 1. `max-age` is moved to `max_age`, overwriting any value already there
//! 2. Unknown keys are rejected, all of them in one error
//! 3. `duration` and `max_age` are parsed to seconds
//! 4. Shutdown-hook fields are type-checked when present
//!
//! `null` values count as absent. Resolution is a pure function of the input,
//! so callers may resolve again instead of caching the result.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::config::duration::parse_duration_secs;
use crate::config::error::ConfigError;
use crate::config::schema::*;

/// Validates plugin configuration for one namespace.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    namespace: String,
}

impl ConfigResolver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn resolve(&self, raw: &RawConfig) -> Result<NormalizedConfig, ConfigError> {
        let raw = normalize_keys(raw);
        self.reject_unknown_keys(&raw)?;

        let mut config = NormalizedConfig {
            idle_duration_secs: duration_field(&raw, KEY_DURATION)?,
            max_age_secs: duration_field(&raw, KEY_MAX_AGE)?,
            ..NormalizedConfig::default()
        };

        if let Some(url) = present(&raw, KEY_SHUTDOWN_URL) {
            config.shutdown_url = resolve_url(url)?;
        }
        if let Some(headers) = present(&raw, KEY_SHUTDOWN_HEADERS) {
            config.shutdown_headers = resolve_headers(headers)?;
        }
        if let Some(method) = present(&raw, KEY_SHUTDOWN_METHOD) {
            config.shutdown_method = resolve_method(method)?;
        }
        if let Some(body) = present(&raw, KEY_SHUTDOWN_BODY) {
            let body = body.as_str().ok_or(ConfigError::ShutdownBodyNotString)?;
            config.shutdown_body = (!body.is_empty()).then(|| body.to_string());
        }

        Ok(config)
    }

    fn reject_unknown_keys(&self, raw: &RawConfig) -> Result<(), ConfigError> {
        let unknown: BTreeSet<&String> = raw
            .keys()
            .filter(|key| !RECOGNIZED_KEYS.contains(&key.as_str()))
            .collect();

        if unknown.is_empty() {
            return Ok(());
        }

        Err(ConfigError::UnknownKeys {
            namespace: self.namespace.clone(),
            keys: unknown.into_iter().cloned().collect(),
        })
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Rewrite the legacy alias to its canonical name.
///
/// The legacy value always wins when both spellings are present.
fn normalize_keys(raw: &RawConfig) -> RawConfig {
    let mut raw = raw.clone();
    if let Some(value) = raw.remove(KEY_MAX_AGE_LEGACY) {
        raw.insert(KEY_MAX_AGE.to_string(), value);
    }
    raw
}

fn present<'a>(raw: &'a RawConfig, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn duration_field(raw: &RawConfig, key: &str) -> Result<Option<u64>, ConfigError> {
    present(raw, key)
        .map(|value| parse_duration_secs(key, value))
        .transpose()
}

fn resolve_url(value: &Value) -> Result<Option<String>, ConfigError> {
    let url = value.as_str().ok_or(ConfigError::ShutdownUrlNotString)?;
    if url.is_empty() {
        return Ok(None);
    }
    if !url.starts_with("http") {
        return Err(ConfigError::ShutdownUrlScheme);
    }
    Ok(Some(url.to_string()))
}

fn resolve_headers(value: &Value) -> Result<BTreeMap<String, String>, ConfigError> {
    let map = value.as_object().ok_or(ConfigError::ShutdownHeadersNotMap)?;
    map.iter()
        .map(|(name, value)| {
            value
                .as_str()
                .map(|value| (name.clone(), value.to_string()))
                .ok_or(ConfigError::ShutdownHeadersNotStrings)
        })
        .collect()
}

fn resolve_method(value: &Value) -> Result<ShutdownMethod, ConfigError> {
    value
        .as_str()
        .ok_or(ConfigError::ShutdownMethodNotString)?
        .parse()
        .map_err(|_| ConfigError::ShutdownMethodUnsupported)
}
