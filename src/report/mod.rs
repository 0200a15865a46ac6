//! Outcome aggregation, summary rendering, and failure persistence.
//!
//! The aggregation loop in the dispatch engine feeds a [`RunSummary`] one
//! outcome at a time; once the pool drains, the summary is rendered as a
//! human-readable block and any failures are persisted as a CSV the next
//! run can consume as a retry subset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::RunConfig;
use crate::worklist::DownloadTask;

/// How many failures the rendered summary lists inline.
const INLINE_FAILURE_LIMIT: usize = 10;

/// Errors persisting the failure file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The failure CSV could not be written.
    #[error("could not write failure file {path}: {source}")]
    Write {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying CSV/IO error.
        #[source]
        source: csv::Error,
    },
}

/// Terminal classification of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The downloader exited zero.
    Success,
    /// The downloader exited nonzero or could not be started.
    Failed {
        /// Best-effort reason extracted from the diagnostic output.
        reason: String,
    },
    /// The output already existed.
    Skipped,
}

/// One persisted failure row: identifier, source URL, and reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Unique video identifier.
    pub video_id: String,
    /// Source URL that failed.
    pub video_url: String,
    /// Best-effort failure reason.
    pub reason: String,
}

/// Aggregated results of a run.
///
/// Counts are updated one outcome at a time by the engine's single
/// aggregation loop; builder-time skips are folded in afterwards via
/// [`RunSummary::record_preskipped`].
#[derive(Debug, Default)]
pub struct RunSummary {
    succeeded: usize,
    failed: usize,
    skipped: usize,
    failures: Vec<FailureRecord>,
}

impl RunSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one task.
    pub fn record(&mut self, task: &DownloadTask, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed { reason } => {
                self.failed += 1;
                self.failures.push(FailureRecord {
                    video_id: task.video_id.clone(),
                    video_url: task.video_url.clone(),
                    reason,
                });
            }
        }
    }

    /// Folds in items skipped during work-list construction.
    pub fn record_preskipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Number of successful downloads.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of failed downloads.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Number of skipped items (pre-existing outputs).
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Total items accounted for (succeeded + failed + skipped).
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// The failure rows, in completion order.
    #[must_use]
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }
}

/// Writes the failure rows to `path` as a CSV with a header row.
///
/// # Errors
///
/// Returns [`ReportError::Write`] on IO or serialization failure.
#[instrument(skip(failures), fields(count = failures.len()))]
pub fn write_failures(path: &Path, failures: &[FailureRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| ReportError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    for record in failures {
        writer.serialize(record).map_err(|e| ReportError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| ReportError::Write {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;

    info!(path = %path.display(), count = failures.len(), "failure list written");
    Ok(())
}

/// Formats an elapsed duration as `Xh Ym Zs`, omitting leading zero units.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Builds the end-of-run summary block, one line per entry.
#[must_use]
pub fn render_summary_lines(
    config: &RunConfig,
    summary: &RunSummary,
    elapsed: Duration,
    failure_file: Option<&Path>,
) -> Vec<String> {
    let rule = "=".repeat(50);
    let divider = "-".repeat(25);

    let mut lines = vec![
        rule.clone(),
        "Download summary".to_string(),
        rule.clone(),
        format!("Split:              {}", config.split),
        format!("Target resolution:  {}", config.resolution),
        format!("Total in work list: {}", summary.total()),
        divider.clone(),
        format!("Downloaded:         {}", summary.succeeded()),
        format!("Skipped (existing): {}", summary.skipped()),
        format!("Failed:             {}", summary.failed()),
        divider,
    ];

    if !summary.failures().is_empty() {
        lines.push("Failed video IDs and reasons:".to_string());
        for failure in summary.failures().iter().take(INLINE_FAILURE_LIMIT) {
            lines.push(format!("  - {}: {}", failure.video_id, failure.reason));
        }
        let remaining = summary.failures().len().saturating_sub(INLINE_FAILURE_LIMIT);
        if remaining > 0 {
            lines.push(format!("  ... and {remaining} more"));
        }
        if let Some(path) = failure_file {
            lines.push(format!("Failure list written to {}", path.display()));
        }
    }

    lines.push(format!("Elapsed: {}", format_duration(elapsed)));
    lines.push(rule);
    lines
}

/// Prints the end-of-run summary block to stdout.
pub fn print_summary(
    config: &RunConfig,
    summary: &RunSummary,
    elapsed: Duration,
    failure_file: Option<&Path>,
) {
    println!();
    for line in render_summary_lines(config, summary, elapsed, failure_file) {
        println!("{line}");
    }
}
