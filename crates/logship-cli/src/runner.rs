// Runner - read the log file in order, transform each line, feed the sink

use crate::config::RunConfig;
use crate::error::IndexError;
use crate::sink::BulkSink;
use logship_core::parser::{LogParser, ParseError};
use logship_core::transform;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What one successful run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub skipped: usize,
    pub documents: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

/// Process the whole log file and flush the sink once at the end.
///
/// The first line that fails to decode, parse or transform stops the run;
/// lines after it are never read and the sink is not flushed. Blank lines
/// are malformed, except a single empty line at the very end of the file.
pub async fn run<S>(
    config: &RunConfig,
    parser: &dyn LogParser,
    sink: &mut S,
) -> Result<RunSummary, IndexError>
where
    S: BulkSink + ?Sized,
{
    let started = Instant::now();
    let file = File::open(&config.log).map_err(|e| {
        IndexError::config(format!("cannot open {}: {}", config.log.display(), e))
    })?;
    let mut reader = BufReader::new(file);

    info!(
        log = %config.log.display(),
        vhost = %config.vhost,
        host = ?config.host,
        format = parser.name(),
        "Reading access log"
    );

    let mut lines = 0;
    let mut skipped = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines += 1;
        let line_no = lines;

        let line = std::str::from_utf8(&buf).map_err(|e| IndexError::Parse {
            line: line_no,
            source: ParseError::Encoding(e.to_string()),
        })?;
        let line = line.trim_end_matches(['\r', '\n']);

        // only an empty last line is tolerated; any other blank line is malformed
        if line.is_empty() && reader.fill_buf()?.is_empty() {
            debug!(line = line_no, "Skipping empty last line");
            skipped += 1;
            break;
        }

        let record = parser
            .parse(line)
            .map_err(|source| IndexError::Parse { line: line_no, source })?;
        let doc = transform(record, &config.vhost, config.host.as_deref())
            .map_err(|source| IndexError::Transform { line: line_no, source })?;

        sink.add(doc).await?;
    }

    sink.flush().await?;

    let stats = sink.stats();
    let summary = RunSummary {
        lines,
        skipped,
        documents: stats.documents,
        batches: stats.batches,
        elapsed: started.elapsed(),
    };
    info!(
        lines = summary.lines,
        documents = summary.documents,
        batches = summary.batches,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Run complete"
    );
    Ok(summary)
}
