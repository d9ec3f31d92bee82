// logship CLI - bulk-index an Apache access log

use clap::Parser;
use colored::Colorize;
use logship_cli::{run, BulkSink, Cli, ElasticsearchSink, IndexError, RunSummary, StdoutSink};
use logship_core::ParserRegistry;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // logs go to stderr so --dry-run output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<RunSummary, IndexError> {
    let config = cli.into_run_config()?;

    let registry = ParserRegistry::with_defaults();
    let parser = registry.get(&config.format).ok_or_else(|| {
        IndexError::config(format!(
            "unknown log format `{}` (available: {})",
            config.format,
            registry.names().join(", ")
        ))
    })?;

    let mut sink: Box<dyn BulkSink> = if config.dry_run {
        Box::new(StdoutSink::new(
            BufWriter::new(io::stdout()),
            config.index.clone(),
            config.doc_type.clone(),
            config.batch_size,
        ))
    } else {
        Box::new(ElasticsearchSink::new(&config)?)
    };

    run(&config, parser, sink.as_mut()).await
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n{}", "Results:".green().bold());
    eprintln!("  {} {}", "Lines:".dimmed(), summary.lines.to_string().cyan());
    eprintln!("  {} {}", "Skipped:".dimmed(), summary.skipped.to_string().yellow());
    eprintln!("  {} {}", "Indexed:".dimmed(), summary.documents.to_string().green());
    eprintln!("  {} {}", "Batches:".dimmed(), summary.batches.to_string().cyan());
    eprintln!("  {} {}ms", "Time:".dimmed(), summary.elapsed.as_millis());
}
