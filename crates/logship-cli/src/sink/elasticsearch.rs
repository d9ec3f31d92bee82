// Elasticsearch sink - sends documents through the `_bulk` API

use super::{build_bulk_body, BulkSink, SinkStats};
use crate::config::RunConfig;
use crate::error::IndexError;
use async_trait::async_trait;
use logship_core::Document;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

pub struct ElasticsearchSink {
    client: Client,
    nodes: Vec<String>,
    index: String,
    doc_type: String,
    batch_size: usize,
    buffer: Vec<Document>,
    stats: SinkStats,
}

impl ElasticsearchSink {
    pub fn new(config: &RunConfig) -> Result<Self, IndexError> {
        // Build client with optional API key header
        let mut headers = HeaderMap::new();
        if let Some(ref key) = config.api_key {
            let mut value = HeaderValue::from_str(&format!("ApiKey {}", key))
                .map_err(|e| IndexError::config(format!("invalid api key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            nodes: config.nodes.iter().map(|n| normalize_node(n)).collect(),
            index: config.index.clone(),
            doc_type: config.doc_type.clone(),
            batch_size: config.batch_size,
            buffer: Vec::with_capacity(config.batch_size),
            stats: SinkStats::default(),
        })
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    async fn send_batch(&mut self) -> Result<(), IndexError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let count = self.buffer.len();
        let body = build_bulk_body(&self.index, &self.doc_type, &self.buffer)?;
        let response = self.post_bulk(body).await?;
        check_bulk_response(&response)?;

        self.buffer.clear();
        self.stats.documents += count;
        self.stats.batches += 1;
        info!(
            documents = count,
            batch = self.stats.batches,
            index = %self.index,
            "Bulk batch indexed"
        );
        Ok(())
    }

    // POST to the first node that accepts a connection
    async fn post_bulk(&self, body: String) -> Result<Value, IndexError> {
        let mut last_error = None;

        for node in &self.nodes {
            let url = format!("{}/_bulk", node);
            debug!(url = %url, bytes = body.len(), "Sending bulk request");

            let result = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(body.clone())
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let error_text = response.text().await.unwrap_or_default();
                        return Err(IndexError::Backend(format!(
                            "{} returned HTTP {}: {}",
                            url, status, error_text
                        )));
                    }
                    return Ok(response.json::<Value>().await?);
                }
                Err(e) if e.is_connect() => {
                    warn!(node = %node, error = %e, "Node unreachable, trying next");
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Err(IndexError::config("no backend nodes configured")),
        }
    }
}

#[async_trait]
impl BulkSink for ElasticsearchSink {
    async fn add(&mut self, doc: Document) -> Result<(), IndexError> {
        self.buffer.push(doc);
        if self.buffer.len() >= self.batch_size {
            self.send_batch().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), IndexError> {
        self.send_batch().await
    }

    fn stats(&self) -> SinkStats {
        self.stats
    }
}

/// `localhost:9200` -> `http://localhost:9200`, trailing slashes dropped
pub fn normalize_node(node: &str) -> String {
    let node = node.trim().trim_end_matches('/');
    if node.starts_with("http://") || node.starts_with("https://") {
        node.to_string()
    } else {
        format!("http://{}", node)
    }
}

/// The bulk API answers 200 even when items fail, so the body decides.
pub fn check_bulk_response(response: &Value) -> Result<(), IndexError> {
    if response.get("errors").and_then(Value::as_bool) != Some(true) {
        return Ok(());
    }

    let items = response
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    // each item is {"<action>": {"status": .., "error": {..}}}
    let errors: Vec<&Value> = items
        .iter()
        .filter_map(|item| item.as_object()?.values().next()?.get("error"))
        .collect();

    let reason = errors
        .first()
        .map(|e| match e.get("reason").and_then(Value::as_str) {
            Some(reason) => reason.to_string(),
            None => e.to_string(),
        })
        .unwrap_or_else(|| "unknown error".to_string());

    Err(IndexError::Backend(format!(
        "{} of {} documents rejected: {}",
        errors.len(),
        items.len(),
        reason
    )))
}
