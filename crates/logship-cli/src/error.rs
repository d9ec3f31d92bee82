// Error taxonomy for a run. Every variant is fatal.

use logship_core::{ParseError, TransformError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse { line: usize, source: ParseError },

    #[error("line {line}: {source}")]
    Transform { line: usize, source: TransformError },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

impl IndexError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
