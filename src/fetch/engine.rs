//! Dispatch engine for concurrent external downloads.
//!
//! This module provides the `FetchEngine` which fans download tasks out
//! across a bounded pool of Tokio tasks, each invoking the external
//! downloader through a [`Fetcher`], and funnels every outcome through a
//! single aggregation loop.
//!
//! # Overview
//!
//! The engine takes the ordered task list produced by the work-list
//! builder, runs each task exactly once, and returns the aggregated
//! [`RunSummary`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vidfetch::fetch::{FetchEngine, ToolPaths, YtDlpFetcher};
//!
//! # async fn example(config: vidfetch::RunConfig, tasks: Vec<vidfetch::DownloadTask>) -> Result<(), Box<dyn std::error::Error>> {
//! let tools = ToolPaths::discover(config.use_aria2c)?;
//! let fetcher = Arc::new(YtDlpFetcher::new(tools, config));
//! let engine = FetchEngine::new(4)?;
//! let progress = indicatif::ProgressBar::hidden();
//! let summary = engine.run(tasks, fetcher, &progress).await;
//! println!("succeeded: {}, failed: {}", summary.succeeded(), summary.failed());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use indicatif::ProgressBar;
use tokio::process::Command;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, instrument, warn};

use super::command::{ToolPaths, build_args};
use super::reason::extract_failure_reason;
use crate::config::RunConfig;
use crate::report::{Outcome, RunSummary};
use crate::worklist::DownloadTask;

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 64;

/// Default worker count if not specified.
pub const DEFAULT_WORKERS: usize = 1;

/// Error type for dispatch engine construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Executes one download and classifies it.
///
/// The engine is seamed on this trait so dispatch and aggregation can be
/// exercised without the real external tool.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Runs the download for `task`, returning its terminal outcome.
    ///
    /// Implementations never fail the run: every problem becomes an
    /// [`Outcome::Failed`] carrying a reason.
    async fn fetch(&self, task: &DownloadTask) -> Outcome;
}

/// [`Fetcher`] backed by a `yt-dlp` subprocess.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    tools: ToolPaths,
    config: RunConfig,
}

impl YtDlpFetcher {
    /// Creates a fetcher over resolved tool paths and a run configuration.
    #[must_use]
    pub fn new(tools: ToolPaths, config: RunConfig) -> Self {
        Self { tools, config }
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    #[instrument(skip(self, task), fields(video_id = %task.video_id))]
    async fn fetch(&self, task: &DownloadTask) -> Outcome {
        // The output may have appeared since the work list was built.
        if self.config.skip_existing && task.output_path.exists() {
            debug!("output appeared after planning, skipping");
            return Outcome::Skipped;
        }

        let args = build_args(task, &self.config, &self.tools);
        debug!(?args, "invoking downloader");

        // output() captures both streams, keeping concurrent invocations
        // off the shared console.
        let output = match Command::new(&self.tools.ytdlp).args(&args).output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "failed to spawn downloader");
                return Outcome::Failed {
                    reason: format!("failed to spawn downloader: {e}"),
                };
            }
        };

        if output.status.success() {
            Outcome::Success
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = extract_failure_reason(&stderr);
            debug!(code = ?output.status.code(), reason = %reason, "downloader exited nonzero");
            Outcome::Failed { reason }
        }
    }
}

/// Dispatch engine with bounded concurrency.
///
/// # Concurrency Model
///
/// - Every download is spawned as its own Tokio task up front
/// - Each task acquires a semaphore permit before starting its download,
///   so at most `workers` downloads are in flight at once
/// - Permits are released automatically when downloads complete (RAII)
/// - Workers send their outcome over a channel; the single receiving loop
///   is the only writer of the running tally, so no lock is needed, and it
///   drains outcomes while the remaining downloads are still running
///
/// Tasks are independent; completions arrive in any order. The engine only
/// guarantees that every submitted task is reflected exactly once in the
/// returned summary.
#[derive(Debug)]
pub struct FetchEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured worker count.
    workers: usize,
}

impl FetchEngine {
    /// Creates a new engine with the specified worker count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWorkers`] if the value is outside the
    /// valid range (1-64).
    #[instrument(level = "debug")]
    pub fn new(workers: usize) -> Result<Self, EngineError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(EngineError::InvalidWorkers { value: workers });
        }

        debug!(workers, "creating fetch engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
        })
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every task exactly once and aggregates the outcomes.
    ///
    /// All tasks are spawned immediately; the aggregation loop below drains
    /// outcomes as they complete, advancing the progress bar and logging
    /// each completion while the rest of the pool is still downloading.
    /// Individual download failures do NOT cause this method to error; they
    /// are counted and carried in the summary.
    #[instrument(skip(self, tasks, fetcher, progress), fields(tasks = tasks.len()))]
    pub async fn run(
        &self,
        tasks: Vec<DownloadTask>,
        fetcher: Arc<dyn Fetcher>,
        progress: &ProgressBar,
    ) -> RunSummary {
        let task_count = tasks.len();
        // Capacity covers every task so workers never block on the channel.
        let (tx, mut rx) = mpsc::channel::<(DownloadTask, Outcome)>(task_count.max(1));
        let mut handles = Vec::with_capacity(task_count);

        info!(tasks = task_count, workers = self.workers, "starting dispatch");

        for task in tasks {
            let semaphore = Arc::clone(&self.semaphore);
            let fetcher = Arc::clone(&fetcher);
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                // Waits here while the pool is at the worker limit; the
                // permit is dropped when this block exits (RAII).
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    // Only possible if the semaphore was closed mid-run.
                    return;
                };

                let outcome = fetcher.fetch(&task).await;
                // The receiver outlives every sender; a failed send means
                // the run is already being torn down.
                let _ = tx.send((task, outcome)).await;
            }));
        }
        drop(tx);

        let mut summary = RunSummary::new();
        while let Some((task, outcome)) = rx.recv().await {
            match &outcome {
                Outcome::Success => info!(video_id = %task.video_id, "download completed"),
                Outcome::Failed { reason } => warn!(
                    video_id = %task.video_id,
                    url = %task.video_url,
                    reason = %reason,
                    "download failed"
                ),
                Outcome::Skipped => debug!(video_id = %task.video_id, "already present, skipped"),
            }
            summary.record(&task, outcome);
            progress.inc(1);
        }

        // All senders are gone once the loop exits; join to surface panics.
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "download task panicked");
            }
        }

        if summary.total() != task_count {
            warn!(
                expected = task_count,
                recorded = summary.total(),
                "outcome count mismatch after pool drain"
            );
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "dispatch complete"
        );

        summary
    }
}
