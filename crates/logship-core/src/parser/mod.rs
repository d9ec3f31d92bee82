//! log parser registry - parse raw access log lines into field records

pub mod access;

pub use access::AccessLogParser;

use crate::Record;
use std::collections::HashMap;
use thiserror::Error;

//parse error type
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line does not match the {format} log format")]
    NoMatch { format: &'static str },

    #[error("unknown log format: {0}")]
    UnknownFormat(String),

    #[error("line is not valid UTF-8: {0}")]
    Encoding(String),
}

// Parser trait - every parser implement this

pub trait LogParser: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, line: &str) -> Result<Record, ParseError>;
}

// Registry to hold all parsers

pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn LogParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self { parsers: HashMap::new() }
    }

    /// Registry with every bundled parser
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AccessLogParser::new()));
        registry
    }

    // register a parser
    pub fn register(&mut self, parser: Box<dyn LogParser>) {
        self.parsers.insert(parser.name().to_string(), parser);
    }

    // Get parser by name
    pub fn get(&self, name: &str) -> Option<&dyn LogParser> {
        self.parsers.get(name).map(|p| p.as_ref())
    }

    // Names of registered parsers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    //parse using specified format
    pub fn parse(&self, format: &str, line: &str) -> Result<Record, ParseError> {
        match self.get(format) {
            Some(parser) => parser.parse(line),
            None => Err(ParseError::UnknownFormat(format.to_string())),
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
