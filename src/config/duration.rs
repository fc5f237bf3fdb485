//! Human-friendly duration strings: one or more ASCII digits and a unit.
//!
//! ```text
//! "30s" -> 30
//! "10m" -> 600
//! "2h"  -> 7200
//! ```

use serde_json::Value;

use crate::config::error::ConfigError;

/// Parse a duration value for `field` into whole seconds.
pub fn parse_duration_secs(field: &str, value: &Value) -> Result<u64, ConfigError> {
    let format_error = || ConfigError::DurationFormat {
        field: field.to_string(),
    };

    let text = value.as_str().ok_or_else(format_error)?;
    let unit = text.chars().last().ok_or_else(format_error)?;
    let digits = &text[..text.len() - unit.len_utf8()];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format_error());
    }

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        _ => {
            return Err(ConfigError::InvalidDuration {
                field: field.to_string(),
            })
        }
    };

    // Digit strings too large for u64 are rejected like any other bad number.
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(format_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<u64, String> {
        parse_duration_secs("duration", &value).map_err(|e| e.to_string())
    }

    #[test]
    fn units_scale_to_seconds() {
        assert_eq!(parse(json!("1s")), Ok(1));
        assert_eq!(parse(json!("1m")), Ok(60));
        assert_eq!(parse(json!("1h")), Ok(3600));
        assert_eq!(parse(json!("10m")), Ok(600));
        assert_eq!(parse(json!("0s")), Ok(0));
    }

    #[test]
    fn malformed_values_share_one_message() {
        let expected = "duration must be a number followed by a unit (s, m, h)";
        let malformed = [
            json!(1),
            json!("2"),
            json!("3min"),
            json!("dog"),
            json!(""),
            json!("s"),
            json!("-5s"),
            json!(true),
        ];
        for value in malformed {
            assert_eq!(parse(value.clone()), Err(expected.to_string()), "{value}");
        }
    }

    #[test]
    fn unknown_unit_is_reported_separately() {
        assert_eq!(parse(json!("5d")), Err("Invalid duration".to_string()));
        assert_eq!(
            parse_duration_secs("max_age", &json!("5x")).unwrap_err().to_string(),
            "Invalid max_age"
        );
    }

    #[test]
    fn non_ascii_unit_does_not_panic() {
        assert_eq!(parse(json!("5é")), Err("Invalid duration".to_string()));
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(parse(json!("99999999999999999999h")).is_err());
        assert!(parse(json!("18446744073709551615h")).is_err());
    }
}
