//! Normalization of non-primitive values into a canonical JSON form.
//!
//! Statements are JSON, which has no date type. A date is written as a
//! *date-like* object, `{"$date": "2024-01-02T03:04:05+02:00"}` or
//! `{"$date": 1704157445000}`, and is emitted as an RFC 3339 string in UTC with
//! millisecond precision. Two date-likes denoting the same instant therefore
//! serialize identically.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::{DriverError, DriverResult};

/// The key that marks an object as a date-like value.
pub const DATE_KEY: &str = "$date";

/// Returns `true` if `value` is an object of the form `{"$date": ...}`.
///
/// This only checks the shape; use [`canonical_date`] to check the timestamp
/// itself.
pub fn is_date_like(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.len() == 1 && map.contains_key(DATE_KEY),
        _ => false,
    }
}

/// Returns the canonical string for a date-like value.
///
/// # Errors
///
/// Returns [`DriverError::Malformed`] if `value` is not date-like or its timestamp
/// cannot be parsed.
pub fn canonical_date(value: &Value) -> DriverResult<String> {
    let inner = match value {
        Value::Object(map) if is_date_like(value) => &map[DATE_KEY],
        other => {
            return Err(DriverError::malformed(format!(
                "Expected a date-like value (`{{\"$date\": ...}}`), but got `{}`.",
                other
            )));
        }
    };

    let instant = match inner {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                DriverError::malformed(format!("Invalid date `{}`: {}.", text, e))
            })?,
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| {
                DriverError::malformed(format!(
                    "Invalid date `{}`: expected milliseconds since the Unix epoch.",
                    number
                ))
            })?,
        other => {
            return Err(DriverError::malformed(format!(
                "Invalid date `{}`: expected an RFC 3339 string or epoch milliseconds.",
                other
            )));
        }
    };

    Ok(format_instant(&instant))
}

/// Builds the canonical JSON value for a timestamp.
///
/// Use this to put dates into statements built from Rust code.
pub fn datetime(instant: DateTime<Utc>) -> Value {
    Value::String(format_instant(&instant))
}

/// Checks every date-like value nested anywhere inside `value`.
///
/// # Errors
///
/// Returns the first [`DriverError::Malformed`] found.
pub fn check_nested_dates(value: &Value) -> DriverResult<()> {
    match value {
        _ if is_date_like(value) => canonical_date(value).map(|_| ()),
        Value::Array(items) => items.iter().try_for_each(check_nested_dates),
        Value::Object(map) => map.values().try_for_each(check_nested_dates),
        _ => Ok(()),
    }
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
