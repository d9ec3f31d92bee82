// Dry-run sink - writes the bulk bodies to a writer instead of a backend

use super::{build_bulk_body, BulkSink, SinkStats};
use crate::error::IndexError;
use async_trait::async_trait;
use logship_core::Document;
use std::io::Write;
use tracing::debug;

pub struct StdoutSink<W> {
    writer: W,
    index: String,
    doc_type: String,
    batch_size: usize,
    buffer: Vec<Document>,
    stats: SinkStats,
}

impl<W: Write + Send> StdoutSink<W> {
    pub fn new(writer: W, index: impl Into<String>, doc_type: impl Into<String>, batch_size: usize) -> Self {
        Self {
            writer,
            index: index.into(),
            doc_type: doc_type.into(),
            batch_size: batch_size.max(1),
            buffer: Vec::new(),
            stats: SinkStats::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_batch(&mut self) -> Result<(), IndexError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let body = build_bulk_body(&self.index, &self.doc_type, &self.buffer)?;
        self.writer.write_all(body.as_bytes())?;

        self.stats.documents += self.buffer.len();
        self.stats.batches += 1;
        debug!(documents = self.buffer.len(), "Dry-run batch written");
        self.buffer.clear();
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> BulkSink for StdoutSink<W> {
    async fn add(&mut self, doc: Document) -> Result<(), IndexError> {
        self.buffer.push(doc);
        if self.buffer.len() >= self.batch_size {
            self.write_batch()?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), IndexError> {
        self.write_batch()?;
        self.writer.flush()?;
        Ok(())
    }

    fn stats(&self) -> SinkStats {
        self.stats
    }
}
