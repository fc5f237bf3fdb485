//! Host configuration loading from disk.
//!
//! The host file is TOML; this plugin's settings live in `[plugins.<namespace>]`.
//!
//! ```toml
//! [plugins.scale-to-zero]
//! duration = "10m"
//! max_age = "2h"
//! shutdown_url = "https://orchestrator.internal/stopped"
//! shutdown_method = "POST"
//! shutdown_headers = { Authorization = "Bearer abc" }
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RawConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Plugin section [plugins.{0}] must be a table")]
    NotATable(String),

    #[error("{key} must not be a non-finite float")]
    NonFiniteFloat { key: String },
}

/// Read the host config file and return the raw mapping for `namespace`.
pub fn load_plugin_config(path: &Path, namespace: &str) -> Result<RawConfig, LoadError> {
    let content = fs::read_to_string(path)?;
    plugin_config_from_str(&content, namespace)
}

/// A missing `plugins` table or namespace yields an empty mapping.
pub fn plugin_config_from_str(content: &str, namespace: &str) -> Result<RawConfig, LoadError> {
    let document: toml::Table = toml::from_str(content)?;

    let section = document
        .get("plugins")
        .and_then(|plugins| plugins.get(namespace));

    match section {
        None => Ok(RawConfig::new()),
        Some(toml::Value::Table(table)) => table
            .iter()
            .map(|(key, value)| Ok((key.clone(), toml_to_json(key, value)?)))
            .collect(),
        Some(_) => Err(LoadError::NotATable(namespace.to_string())),
    }
}

/// `key` is the dotted path of `value`, used in errors.
///
/// Non-finite floats are rejected: JSON cannot hold them, and a `null` in
/// their place would read as "not configured".
fn toml_to_json(key: &str, value: &toml::Value) -> Result<serde_json::Value, LoadError> {
    use serde_json::{Number, Value};

    let json = match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| LoadError::NonFiniteFloat {
                key: key.to_string(),
            })?,
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| toml_to_json(&format!("{key}[{i}]"), item))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(name, item)| {
                    let path = format!("{key}.{name}");
                    Ok((name.clone(), toml_to_json(&path, item)?))
                })
                .collect::<Result<_, LoadError>>()?,
        ),
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigResolver;
    use serde_json::json;

    #[test]
    fn reads_namespaced_section() {
        let raw = plugin_config_from_str(
            r#"
            [server]
            port = 8001

            [plugins.scale-to-zero]
            duration = "10m"
            max-age = "2h"
            shutdown_headers = { Authorization = "Bearer abc" }
            "#,
            "scale-to-zero",
        )
        .unwrap();

        assert_eq!(raw.get("duration"), Some(&json!("10m")));
        assert_eq!(raw.get("max-age"), Some(&json!("2h")));
        assert_eq!(
            raw.get("shutdown_headers"),
            Some(&json!({"Authorization": "Bearer abc"}))
        );
    }

    #[test]
    fn non_string_values_survive_conversion() {
        let raw = plugin_config_from_str(
            "[plugins.scale-to-zero]\nduration = 5\nshutdown_headers = { a = 1 }\n",
            "scale-to-zero",
        )
        .unwrap();
        assert_eq!(raw.get("duration"), Some(&json!(5)));
        assert_eq!(raw.get("shutdown_headers"), Some(&json!({"a": 1})));
    }

    #[test]
    fn non_finite_floats_abort_loading() {
        for (content, key) in [
            ("duration = nan", "duration"),
            ("max_age = inf", "max_age"),
            ("max-age = -inf", "max-age"),
            ("shutdown_url = nan", "shutdown_url"),
            ("shutdown_headers = { a = inf }", "shutdown_headers.a"),
        ] {
            let toml = format!("[plugins.scale-to-zero]\n{content}\n");
            let err = plugin_config_from_str(&toml, "scale-to-zero").unwrap_err();
            assert!(
                matches!(err, LoadError::NonFiniteFloat { key: ref k } if k == key),
                "{content}: {err}"
            );
        }
    }

    #[test]
    fn finite_float_reaches_resolver_and_fails() {
        let raw = plugin_config_from_str(
            "[plugins.scale-to-zero]\nduration = 1.5\n",
            "scale-to-zero",
        )
        .unwrap();
        assert_eq!(raw.get("duration"), Some(&json!(1.5)));

        let err = ConfigResolver::default().resolve(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "duration must be a number followed by a unit (s, m, h)"
        );
    }

    #[test]
    fn missing_section_is_empty() {
        assert!(plugin_config_from_str("", "scale-to-zero").unwrap().is_empty());
        assert!(plugin_config_from_str("[plugins.other]\nx = 1\n", "scale-to-zero")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn scalar_section_is_rejected() {
        let err = plugin_config_from_str("[plugins]\nscale-to-zero = 3\n", "scale-to-zero")
            .unwrap_err();
        assert!(matches!(err, LoadError::NotATable(_)));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = plugin_config_from_str("[plugins", "scale-to-zero").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_plugin_config(Path::new("/definitely/not/here.toml"), "x").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
