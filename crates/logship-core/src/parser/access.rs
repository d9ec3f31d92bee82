// Apache access log parser (common and combined formats)

use super::{LogParser, ParseError};
use crate::{fields, Record};
use regex::{Captures, Regex};
use serde_json::Value;

pub struct AccessLogParser {
    // combined: host ident user [datetime] "request" status bytes "referer" "user agent"
    combined_pattern: Regex,
    // common (CLF): host ident user [datetime] "request" status bytes
    common_pattern: Regex,
}

impl AccessLogParser {
    pub fn new() -> Self {
        Self {
            combined_pattern: Regex::new(
                r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "((?:[^"\\]|\\.)*)" (\S+) (\S+) "((?:[^"\\]|\\.)*)" "((?:[^"\\]|\\.)*)"\s*$"#
            ).unwrap(),
            common_pattern: Regex::new(
                r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "((?:[^"\\]|\\.)*)" (\S+) (\S+)\s*$"#
            ).unwrap(),
        }
    }

    fn insert(record: &mut Record, key: &str, value: &str) {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }

    fn common_fields(record: &mut Record, caps: &Captures) {
        let get = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");

        Self::insert(record, fields::REMOTE_HOST, get(1));
        Self::insert(record, fields::IDENT, get(2));
        Self::insert(record, fields::USER, get(3));

        let datetime = get(4);
        Self::insert(record, fields::DATETIME, datetime);
        Self::split_datetime(record, datetime);

        let request = get(5);
        Self::insert(record, fields::REQUEST, request);
        Self::split_request(record, request);

        Self::insert(record, fields::STATUS, get(6));
        Self::insert(record, fields::BYTES, get(7));
    }

    // 10/Oct/2023:13:55:36 +0200 -> date, time, timezone
    fn split_datetime(record: &mut Record, datetime: &str) {
        let (stamp, zone) = match datetime.split_once(' ') {
            Some((stamp, zone)) => (stamp, Some(zone)),
            None => (datetime, None),
        };
        if let Some((date, time)) = stamp.split_once(':') {
            Self::insert(record, fields::DATE, date);
            Self::insert(record, fields::TIME, time);
        }
        if let Some(zone) = zone {
            Self::insert(record, fields::TIMEZONE, zone);
        }
    }

    // "GET /path HTTP/1.1" -> method, path, protocol
    fn split_request(record: &mut Record, request: &str) {
        let parts: Vec<&str> = request.split_whitespace().collect();
        if let [method, path, protocol] = parts.as_slice() {
            Self::insert(record, fields::METHOD, method);
            Self::insert(record, fields::PATH, path);
            Self::insert(record, fields::PROTOCOL, protocol);
        }
    }
}

impl Default for AccessLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for AccessLogParser {
    fn name(&self) -> &'static str {
        "access"
    }

    fn parse(&self, line: &str) -> Result<Record, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut record = Record::new();

        // Try combined format first
        if let Some(caps) = self.combined_pattern.captures(line) {
            Self::common_fields(&mut record, &caps);
            Self::insert(&mut record, fields::REFERER, caps.get(8).map(|m| m.as_str()).unwrap_or(""));
            Self::insert(&mut record, fields::USER_AGENT, caps.get(9).map(|m| m.as_str()).unwrap_or(""));
            return Ok(record);
        }

        // Then common format
        if let Some(caps) = self.common_pattern.captures(line) {
            Self::common_fields(&mut record, &caps);
            return Ok(record);
        }

        Err(ParseError::NoMatch { format: self.name() })
    }
}
