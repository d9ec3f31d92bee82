// Line transformer - turns a parsed record into an indexable document

use crate::{fields, Document, Record};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;
use thiserror::Error;

/// Layout of the combined timestamp, e.g. `10/Oct/2023:13:55:36 +0200`
pub const DATETIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Layout of `@timestamp`: UTC, second precision, literal `T` and `Z`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// integer or float literal with optional sign and exponent
static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").unwrap()
});

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("record has no `datetime` field")]
    MissingDatetime,

    #[error("invalid datetime {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("vhost must not be empty")]
    EmptyVhost,
}

/// Build the document for one log line.
///
/// Drops `date`, `time` and `timezone`, turns numeric-looking `bytes` and
/// `status` into numbers, adds `@timestamp` (UTC) and `vhost`, and adds
/// `host` only when one is given.
pub fn transform(
    mut record: Record,
    vhost: &str,
    host: Option<&str>,
) -> Result<Document, TransformError> {
    if vhost.trim().is_empty() {
        return Err(TransformError::EmptyVhost);
    }

    for key in fields::REDUNDANT {
        record.remove(key);
    }

    for key in fields::NUMERIC {
        if let Some(value) = record.get_mut(key) {
            coerce_numeric(value);
        }
    }

    let timestamp = match record.get(fields::DATETIME) {
        Some(Value::String(raw)) => normalize_timestamp(raw)?,
        Some(other) => {
            return Err(TransformError::Timestamp {
                value: other.to_string(),
                reason: "not a string".to_string(),
            })
        }
        None => return Err(TransformError::MissingDatetime),
    };
    record.insert(fields::TIMESTAMP.to_string(), Value::String(timestamp));

    record.insert(fields::VHOST.to_string(), Value::String(vhost.to_string()));
    if let Some(host) = host {
        record.insert(fields::HOST.to_string(), Value::String(host.to_string()));
    }

    Ok(record)
}

/// Replace a numeric-looking string with its number, in place.
///
/// Integers become `i64` where they fit, everything else numeric becomes
/// `f64`. Values that are not strings, or not numeric (`-` for an empty
/// response body), are left untouched.
pub fn coerce_numeric(value: &mut Value) {
    let Value::String(text) = &*value else {
        return;
    };
    if !NUMERIC_PATTERN.is_match(text) {
        return;
    }

    let number = match text.parse::<i64>() {
        Ok(int) => Some(Number::from(int)),
        Err(_) => text.parse::<f64>().ok().and_then(Number::from_f64),
    };
    if let Some(number) = number {
        *value = Value::Number(number);
    }
}

/// Parse an access log timestamp and render it as UTC ISO-8601.
pub fn normalize_timestamp(raw: &str) -> Result<String, TransformError> {
    let parsed = DateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| {
        TransformError::Timestamp {
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(parsed.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string())
}
