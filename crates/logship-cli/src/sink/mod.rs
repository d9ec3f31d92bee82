//! Bulk sinks - where transformed documents go

pub mod elasticsearch;
pub mod stdout;

pub use elasticsearch::ElasticsearchSink;
pub use stdout::StdoutSink;

use crate::error::IndexError;
use async_trait::async_trait;
use logship_core::Document;
use serde::Serialize;

/// Counters kept by a sink over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub documents: usize,
    pub batches: usize,
}

// Sink trait - buffers documents and submits them in batches
#[async_trait]
pub trait BulkSink: Send {
    /// Queue one document, sending a batch once enough are buffered.
    async fn add(&mut self, doc: Document) -> Result<(), IndexError>;

    /// Submit everything still buffered. Returns once the backend has
    /// accepted it, or with the error that stopped it.
    async fn flush(&mut self) -> Result<(), IndexError>;

    fn stats(&self) -> SinkStats;
}

// {"index":{"_index":"logs","_type":"access_log_entry"}}
#[derive(Serialize)]
struct BulkAction<'a> {
    index: BulkTarget<'a>,
}

#[derive(Serialize)]
struct BulkTarget<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    // left out when empty, Elasticsearch 8 rejects `_type`
    #[serde(rename = "_type", skip_serializing_if = "str::is_empty")]
    doc_type: &'a str,
}

/// Build a `_bulk` request body (NDJSON): one action line followed by the
/// document line, for every document, newline terminated.
pub fn build_bulk_body(
    index: &str,
    doc_type: &str,
    docs: &[Document],
) -> Result<String, IndexError> {
    let action = serde_json::to_string(&BulkAction {
        index: BulkTarget { index, doc_type },
    })?;

    let mut body = String::new();
    for doc in docs {
        body.push_str(&action);
        body.push('\n');
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(status: u16) -> Document {
        match json!({ "status": status, "vhost": "example.com" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_bulk_body_pairs() {
        let body = build_bulk_body("logs", "access_log_entry", &[doc(200), doc(404)]).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));
        for action in [lines[0], lines[2]] {
            assert_eq!(
                serde_json::from_str::<Value>(action).unwrap(),
                json!({ "index": { "_index": "logs", "_type": "access_log_entry" } })
            );
        }
        assert_eq!(serde_json::from_str::<Value>(lines[3]).unwrap()["status"], json!(404));
    }

    #[test]
    fn test_bulk_body_without_type() {
        let body = build_bulk_body("logs", "", &[doc(200)]).unwrap();
        let action = body.lines().next().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(action).unwrap(),
            json!({ "index": { "_index": "logs" } })
        );
    }

    #[test]
    fn test_bulk_body_empty() {
        assert_eq!(build_bulk_body("logs", "t", &[]).unwrap(), "");
    }
}
