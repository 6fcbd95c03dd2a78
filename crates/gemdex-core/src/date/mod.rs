//! Date canonicalization.
//!
//! Gemspec metadata encodes dates a handful of ways: a plain `YYYY-MM-DD`
//! date, an RFC 3339 timestamp, or a free-form string with fractional
//! seconds and a zone suffix that YAML leaves untouched (e.g.
//! `2011-08-25 00:00:00.000000000 Z`). All of them canonicalize to a UTC
//! `YYYY-MM-DD` string. Any other value shape is fatal.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_yaml::Value;

use crate::error::{GemdexError, GemdexResult};

const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Canonicalize a raw date value to `YYYY-MM-DD`.
///
/// Only string values are accepted; integers, mappings, nulls and anything
/// else fail with `UnexpectedDateValue`. Canonicalization is idempotent:
/// an already-canonical date passes through unchanged.
pub fn canonicalize(value: &Value) -> GemdexResult<String> {
    match value {
        Value::String(text) => canonicalize_str(text),
        other => Err(unexpected(other)),
    }
}

/// Canonicalize a textual date or timestamp to `YYYY-MM-DD`
pub fn canonicalize_str(text: &str) -> GemdexResult<String> {
    let trimmed = text.trim();

    // Date-only values format directly.
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, CANONICAL_FORMAT) {
        return Ok(date.format(CANONICAL_FORMAT).to_string());
    }

    if let Some(utc) = parse_timestamp(trimmed) {
        return Ok(utc.format(CANONICAL_FORMAT).to_string());
    }

    // Permissive salvage: a leading date token is enough. Anything less is
    // rejected rather than silently passed through.
    if let Some(first) = trimmed.split_whitespace().next() {
        if let Ok(date) = NaiveDate::parse_from_str(first, CANONICAL_FORMAT) {
            return Ok(date.format(CANONICAL_FORMAT).to_string());
        }
    }

    Err(GemdexError::UnexpectedDateValue {
        value: format!("{:?}", text),
    })
}

/// Try the timestamp encodings seen in the wild, yielding a UTC timestamp
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(zoned.with_timezone(&Utc));
    }

    // `2011-08-25 00:00:00.000000000 +09:00` and the no-space variant.
    for format in ["%Y-%m-%d %H:%M:%S%.f %:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(zoned) = DateTime::<FixedOffset>::parse_from_str(text, format) {
            return Some(zoned.with_timezone(&Utc));
        }
    }

    // `Z` / `UTC` suffixed timestamps, with or without a separating space.
    let naive = text
        .strip_suffix("UTC")
        .or_else(|| text.strip_suffix('Z'))
        .map(str::trim_end)
        .unwrap_or(text);
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(stamp.and_utc());
        }
    }

    None
}

fn unexpected(value: &Value) -> GemdexError {
    let shape = match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::Sequence(_) => "sequence".to_string(),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged node {}", tagged.tag),
        Value::String(_) => unreachable!("strings are handled by the caller"),
    };
    GemdexError::UnexpectedDateValue { value: shape }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_date_is_idempotent() {
        assert_eq!(canonicalize_str("2020-01-01").unwrap(), "2020-01-01");
        assert_eq!(canonicalize_str(" 2020-01-01 ").unwrap(), "2020-01-01");
    }

    #[test]
    fn test_zoned_fractional_timestamp() {
        assert_eq!(
            canonicalize_str("2011-08-25 00:00:00.000000000Z").unwrap(),
            "2011-08-25"
        );
        assert_eq!(
            canonicalize_str("2011-08-25 00:00:00.000000000 Z").unwrap(),
            "2011-08-25"
        );
    }

    #[test]
    fn test_rfc3339_converts_to_utc() {
        assert_eq!(
            canonicalize_str("2011-08-25T23:30:00+09:00").unwrap(),
            "2011-08-25"
        );
        // Offset pushes the UTC date back a day.
        assert_eq!(
            canonicalize_str("2011-08-25T01:30:00+09:00").unwrap(),
            "2011-08-24"
        );
    }

    #[test]
    fn test_offset_timestamp_without_t() {
        assert_eq!(
            canonicalize_str("2011-08-25 01:30:00.000000000 +09:00").unwrap(),
            "2011-08-24"
        );
    }

    #[test]
    fn test_bare_datetime_treated_as_utc() {
        assert_eq!(
            canonicalize_str("2011-08-25 12:00:00").unwrap(),
            "2011-08-25"
        );
    }

    #[test]
    fn test_leading_date_token_salvaged() {
        assert_eq!(
            canonicalize_str("2011-08-25 whenever").unwrap(),
            "2011-08-25"
        );
    }

    #[test]
    fn test_non_string_values_are_fatal() {
        for value in [
            Value::Number(20110825.into()),
            Value::Null,
            Value::Bool(true),
            Value::Sequence(vec![]),
        ] {
            let err = canonicalize(&value).unwrap_err();
            assert!(matches!(err, GemdexError::UnexpectedDateValue { .. }));
        }
    }

    #[test]
    fn test_garbage_string_is_rejected() {
        assert!(canonicalize_str("not a date").is_err());
        assert!(canonicalize_str("").is_err());
    }
}
