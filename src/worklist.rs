//! Work-list construction: which videos a run will actually fetch.
//!
//! Manifest records pass through four stages, in a fixed order: dedupe by
//! identifier, restrict to the retry subset (when given), drop items whose
//! output already exists (when `skip_existing` is set, counted but not
//! scheduled), then truncate to the configured maximum. Skips are counted
//! before truncation applies.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::config::RunConfig;
use crate::manifest::VideoRecord;

/// One scheduled download, derived from a manifest record and the run
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Unique video identifier.
    pub video_id: String,
    /// Source URL handed to the downloader.
    pub video_url: String,
    /// Where the downloaded file lands.
    pub output_path: PathBuf,
}

/// The tasks a run will execute, plus the items excluded up front because
/// their output already exists.
#[derive(Debug, Default)]
pub struct WorkList {
    /// Ordered tasks to dispatch.
    pub tasks: Vec<DownloadTask>,
    /// Items excluded during construction (output already present).
    pub skipped: usize,
}

impl WorkList {
    /// Builds the work list from manifest records.
    #[instrument(skip(records, retry_subset, config), fields(records = records.len()))]
    #[must_use]
    pub fn build(
        records: Vec<VideoRecord>,
        retry_subset: Option<&HashSet<String>>,
        config: &RunConfig,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();
        let mut skipped = 0usize;

        for record in records {
            if !seen.insert(record.video_id.clone()) {
                continue;
            }
            if let Some(subset) = retry_subset
                && !subset.contains(&record.video_id)
            {
                continue;
            }

            let output_path = config.output_path(&record.video_id);
            if config.skip_existing && output_path.exists() {
                skipped += 1;
                debug!(video_id = %record.video_id, "output exists, skipping");
                continue;
            }

            tasks.push(DownloadTask {
                video_id: record.video_id,
                video_url: record.video_url,
                output_path,
            });
        }

        if let Some(max) = config.max_videos {
            tasks.truncate(max);
        }

        debug!(tasks = tasks.len(), skipped, "work list built");
        Self { tasks, skipped }
    }

    /// Number of items the work list accounts for (tasks + skips).
    #[must_use]
    pub fn total(&self) -> usize {
        self.tasks.len() + self.skipped
    }

    /// Returns true when there is nothing to dispatch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
