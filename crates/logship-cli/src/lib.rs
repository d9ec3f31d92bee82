//! logship - ship Apache access logs into an Elasticsearch-compatible store
//! reads a log file line by line, transforms each line into a document and
//! hands it to a bulk sink.

pub mod config;
pub mod error;
pub mod runner;
pub mod sink;

pub use config::{Cli, RunConfig};
pub use error::IndexError;
pub use runner::{run, RunSummary};
pub use sink::{BulkSink, ElasticsearchSink, SinkStats, StdoutSink};
