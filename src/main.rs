//! CLI entry point for the vidfetch tool.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use vidfetch::{
    FetchEngine, ToolPaths, WorkList, YtDlpFetcher, load_retry_subset, load_split, progress,
    report,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let quiet = args.quiet;
    let config = args.into_config();
    config.validate()?;

    // Resolve external tools before any work is scheduled; a missing binary
    // is a configuration error, not a per-item failure.
    let tools = ToolPaths::discover(config.use_aria2c)?;

    let retry_subset = match &config.retry_file {
        Some(path) => Some(load_retry_subset(path)?),
        None => None,
    };

    let records = load_split(&config.manifest_path())?;
    std::fs::create_dir_all(config.output_dir())?;

    let worklist = WorkList::build(records, retry_subset.as_ref(), &config);
    info!(
        split = %config.split,
        tasks = worklist.tasks.len(),
        skipped = worklist.skipped,
        "work list ready"
    );
    if worklist.is_empty() {
        info!("no downloads to dispatch");
    }

    let started = Instant::now();
    let total = u64::try_from(worklist.tasks.len()).unwrap_or(u64::MAX);
    let bar = progress::batch_progress_bar(total, quiet);

    let engine = FetchEngine::new(config.workers)?;
    let fetcher = Arc::new(YtDlpFetcher::new(tools, config.clone()));
    let preskipped = worklist.skipped;

    let mut summary = engine.run(worklist.tasks, fetcher, &bar).await;
    bar.finish_and_clear();
    summary.record_preskipped(preskipped);

    let failure_file = if summary.failures().is_empty() {
        None
    } else {
        let path = config.failure_output_path();
        report::write_failures(&path, summary.failures())?;
        Some(path)
    };

    report::print_summary(&config, &summary, started.elapsed(), failure_file.as_deref());

    // Per-item failures are reported, not fatal; only configuration errors
    // above bubble into a nonzero exit.
    Ok(())
}
