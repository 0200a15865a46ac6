//! Run configuration shared by the work-list builder, dispatcher, and reporter.
//!
//! Every knob of a run (pool size, acceleration, error suppression, auth
//! cookies, limits) lives here as explicit data so the rest of the crate
//! branches on one struct instead of scattered flags.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use thiserror::Error;

use crate::manifest::Split;

/// Errors detected while validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The cookie file passed via `--cookies` does not exist.
    #[error("cookie file not found: {0}")]
    CookiesNotFound(PathBuf),

    /// The retry file passed via `--failed-videos-file` does not exist.
    #[error("failed-videos file not found: {0}")]
    RetryFileNotFound(PathBuf),
}

/// Output height ceiling for downloaded videos.
///
/// Rendered as `<height>p` in paths and summaries (e.g. `360p`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resolution {
    #[value(name = "144")]
    P144,
    #[value(name = "240")]
    P240,
    #[value(name = "360")]
    P360,
    #[value(name = "480")]
    P480,
    #[value(name = "720")]
    P720,
    #[value(name = "1080")]
    P1080,
}

impl Resolution {
    /// Height ceiling in pixels, as passed to the downloader's format filter.
    #[must_use]
    pub fn height(self) -> u32 {
        match self {
            Self::P144 => 144,
            Self::P240 => 240,
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

/// Full configuration for one batch run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Dataset split to download.
    pub split: Split,
    /// Directory holding the per-split manifest CSVs.
    pub manifest_dir: PathBuf,
    /// Root directory for downloaded videos.
    pub video_dir: PathBuf,
    /// Output height ceiling.
    pub resolution: Resolution,
    /// Skip items whose output file already exists.
    pub skip_existing: bool,
    /// Worker pool size (concurrent subprocess invocations).
    pub workers: usize,
    /// Fragment/connection concurrency passed to the downloader.
    pub threads: u32,
    /// Use aria2c as the external accelerator.
    pub use_aria2c: bool,
    /// Pass warning/error suppression flags to the downloader.
    pub suppress_errors: bool,
    /// Cap on the number of videos to process.
    pub max_videos: Option<usize>,
    /// Prior failure file restricting this run to its identifiers.
    pub retry_file: Option<PathBuf>,
    /// Cookie file forwarded to the downloader.
    pub cookies: Option<PathBuf>,
}

impl RunConfig {
    /// Checks that files named by the configuration actually exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the cookie or retry file is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(cookies) = &self.cookies
            && !cookies.exists()
        {
            return Err(ConfigError::CookiesNotFound(cookies.clone()));
        }
        if let Some(retry) = &self.retry_file
            && !retry.exists()
        {
            return Err(ConfigError::RetryFileNotFound(retry.clone()));
        }
        Ok(())
    }

    /// Path of the split manifest CSV.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_dir
            .join(format!("{}.csv", self.split.as_str()))
    }

    /// Resolution-specific output directory (`<video_dir>/<resolution>/`).
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.video_dir.join(self.resolution.to_string())
    }

    /// Output path for one video identifier.
    #[must_use]
    pub fn output_path(&self, video_id: &str) -> PathBuf {
        self.output_dir().join(format!("{video_id}.mp4"))
    }

    /// Where this run persists its failures.
    ///
    /// Derived from split and resolution; a `_retry` suffix keeps a retry
    /// run from overwriting the failure file it was fed as input.
    #[must_use]
    pub fn failure_output_path(&self) -> PathBuf {
        let suffix = if self.retry_file.is_some() {
            "_retry"
        } else {
            ""
        };
        self.video_dir.join(format!(
            "failed_videos_{}_{}{suffix}.csv",
            self.split.as_str(),
            self.resolution
        ))
    }
}
