//! Subprocess dispatch engine for external video downloads.
//!
//! This module drives `yt-dlp` (optionally accelerated by `aria2c`) as a
//! subprocess, one invocation per work item, across a bounded worker pool.
//!
//! # Features
//!
//! - PATH discovery of the external tools before any work is scheduled
//! - Captured subprocess output (no interleaving on the shared console)
//! - Exit-status classification into per-item outcomes
//! - Best-effort failure reasons extracted from the tool's stderr
//! - Message-passing aggregation: workers report to a single consumer
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vidfetch::fetch::{FetchEngine, ToolPaths, YtDlpFetcher};
//!
//! # async fn example(config: vidfetch::RunConfig, tasks: Vec<vidfetch::DownloadTask>) -> Result<(), Box<dyn std::error::Error>> {
//! let tools = ToolPaths::discover(config.use_aria2c)?;
//! let engine = FetchEngine::new(config.workers)?;
//! let fetcher = Arc::new(YtDlpFetcher::new(tools, config));
//! let progress = indicatif::ProgressBar::hidden();
//! let summary = engine.run(tasks, fetcher, &progress).await;
//! println!("failed: {}", summary.failed());
//! # Ok(())
//! # }
//! ```

mod command;
mod engine;
mod reason;

pub use command::{ToolError, ToolPaths, build_args};
pub use engine::{DEFAULT_WORKERS, EngineError, FetchEngine, Fetcher, YtDlpFetcher};
pub use reason::{UNKNOWN_REASON, extract_failure_reason};
