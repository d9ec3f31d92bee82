//! Run configuration: command-line flags, an optional TOML file, and the
//! validated `RunConfig` both resolve into.

use crate::error::IndexError;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_INDEX: &str = "logs";
pub const DEFAULT_TYPE: &str = "access_log_entry";
pub const DEFAULT_NODE: &str = "localhost:9200";
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FORMAT: &str = "access";

#[derive(Parser, Debug)]
#[command(name = "logship")]
#[command(version)]
#[command(about = "Bulk-index Apache access logs into Elasticsearch", long_about = None)]
pub struct Cli {
    /// Value for the `host` field of every document (omitted if unset)
    #[arg(long, env = "LOGSHIP_HOST")]
    pub host: Option<String>,

    /// Value for the `vhost` field of every document (required)
    #[arg(long, env = "LOGSHIP_VHOST")]
    pub vhost: Option<String>,

    /// Path to the access log file (required)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Target index [default: logs]
    #[arg(short, long, env = "LOGSHIP_INDEX")]
    pub index: Option<String>,

    /// Document type sent with each bulk action, "" to leave it out [default: access_log_entry]
    #[arg(long = "type")]
    pub doc_type: Option<String>,

    /// Backend nodes, comma separated or repeated [default: localhost:9200]
    #[arg(short, long, env = "LOGSHIP_NODES", value_delimiter = ',')]
    pub nodes: Vec<String>,

    /// Documents per bulk request [default: 500]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// API key for the backend
    #[arg(short = 'k', long, env = "LOGSHIP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log line format [default: access]
    #[arg(short, long)]
    pub format: Option<String>,

    /// TOML file with any of the options above; flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the bulk request bodies to stdout instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

// Options as they may appear in the TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub vhost: Option<String>,
    pub log: Option<PathBuf>,
    pub index: Option<String>,

    #[serde(rename = "type")]
    pub doc_type: Option<String>,

    pub nodes: Option<Vec<String>>,
    pub batch_size: Option<usize>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<String>,
}

/// Validated, immutable settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub vhost: String,
    pub host: Option<String>,
    pub log: PathBuf,
    pub index: String,
    pub doc_type: String,
    pub nodes: Vec<String>,
    pub batch_size: usize,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub format: String,
    pub dry_run: bool,
}

// Load a TOML config file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig, IndexError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| IndexError::config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| IndexError::config(format!("invalid config {}: {}", path.display(), e)))
}

impl Cli {
    /// Merge flags over the optional config file and validate the result.
    pub fn into_run_config(self) -> Result<RunConfig, IndexError> {
        let file = match &self.config {
            Some(path) => load_config(path)?,
            None => FileConfig::default(),
        };
        self.merge(file).validate()
    }

    fn merge(self, file: FileConfig) -> Cli {
        Cli {
            host: self.host.or(file.host),
            vhost: self.vhost.or(file.vhost),
            log: self.log.or(file.log),
            index: self.index.or(file.index),
            doc_type: self.doc_type.or(file.doc_type),
            nodes: if self.nodes.is_empty() {
                file.nodes.unwrap_or_default()
            } else {
                self.nodes
            },
            batch_size: self.batch_size.or(file.batch_size),
            api_key: self.api_key.or(file.api_key),
            timeout_secs: self.timeout_secs.or(file.timeout_secs),
            format: self.format.or(file.format),
            config: self.config,
            dry_run: self.dry_run,
        }
    }

    fn validate(self) -> Result<RunConfig, IndexError> {
        let vhost = match self.vhost {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Err(IndexError::config("missing required option `vhost`")),
        };
        let log = self
            .log
            .ok_or_else(|| IndexError::config("missing required option `log`"))?;

        let index = self.index.unwrap_or_else(|| DEFAULT_INDEX.to_string());
        if index.is_empty() {
            return Err(IndexError::config("`index` must not be empty"));
        }

        let nodes: Vec<String> = self
            .nodes
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        let nodes = if nodes.is_empty() {
            vec![DEFAULT_NODE.to_string()]
        } else {
            nodes
        };

        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(IndexError::config("`batch_size` must be at least 1"));
        }

        Ok(RunConfig {
            vhost,
            host: self.host.filter(|h| !h.is_empty()),
            log,
            index,
            doc_type: self.doc_type.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            nodes,
            batch_size,
            api_key: self.api_key,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            format: self.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            dry_run: self.dry_run,
        })
    }
}
