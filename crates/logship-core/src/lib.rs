//! Core types for the access log shipper
//! shared by the parser, the transformer and the cli.
pub mod parser;
pub mod transform;

pub use parser::{AccessLogParser, LogParser, ParseError, ParserRegistry};
pub use transform::{coerce_numeric, normalize_timestamp, transform, TransformError};

use serde_json::{Map, Value};

// RECORD //

/// Fields produced by a log parser for one line, keyed by field name.
/// Values stay JSON so a parser may hand over strings or numbers
pub type Record = Map<String, Value>;

// document (what gets indexed), one per log line
pub type Document = Map<String, Value>;

pub mod fields {
    // e.g. `10/Oct/2023:13:55:36 +0200`
    pub const DATETIME: &str = "datetime";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const TIMEZONE: &str = "timezone";

    pub const BYTES: &str = "bytes";
    pub const STATUS: &str = "status";

    pub const REMOTE_HOST: &str = "remote_host";
    pub const IDENT: &str = "ident";
    pub const USER: &str = "user";
    pub const REQUEST: &str = "request";
    pub const METHOD: &str = "method";
    pub const PATH: &str = "path";
    pub const PROTOCOL: &str = "protocol";
    pub const REFERER: &str = "referer";
    pub const USER_AGENT: &str = "user_agent";

    pub const TIMESTAMP: &str = "@timestamp";
    pub const VHOST: &str = "vhost";
    pub const HOST: &str = "host";

    // dropped once @timestamp exists
    pub const REDUNDANT: [&str; 3] = [DATE, TIME, TIMEZONE];
    pub const NUMERIC: [&str; 2] = [BYTES, STATUS];
}
