//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use vidfetch::{DEFAULT_WORKERS, Resolution, RunConfig, Split};

/// Bulk-download dataset videos with yt-dlp.
///
/// Vidfetch reads a split manifest of video identifiers and URLs, fans the
/// downloads out across a bounded worker pool, and reports (and persists)
/// whatever failed so a later run can retry just that subset.
#[derive(Parser, Debug)]
#[command(name = "vidfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Dataset split to download
    #[arg(long, value_enum, default_value_t = Split::TestExpert)]
    pub split: Split,

    /// Directory holding the per-split manifest CSVs
    #[arg(long, default_value = "../data/splits")]
    pub manifest_dir: PathBuf,

    /// Directory to store downloaded videos
    #[arg(long, default_value = "../data/videos")]
    pub video_dir: PathBuf,

    /// Height ceiling for video download (e.g., 360, 720, 1080)
    #[arg(long, value_enum, default_value_t = Resolution::P360)]
    pub resolution: Resolution,

    /// Skip downloading videos whose output file already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Number of parallel workers for downloading videos (1-64)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS as u8, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub workers: u8,

    /// Fragment/connection concurrency passed to the downloader (1-32)
    #[arg(short = 't', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub threads: u8,

    /// Disable the aria2c external download accelerator
    #[arg(long)]
    pub no_aria2c: bool,

    /// Pass warning/error suppression flags to the downloader
    #[arg(long, visible_alias = "silence-errors")]
    pub suppress_errors: bool,

    /// Maximum number of videos to download (for debug runs)
    #[arg(long)]
    pub max_videos: Option<usize>,

    /// Failure file from a previous run; restricts this run to its identifiers
    #[arg(long)]
    pub failed_videos_file: Option<PathBuf>,

    /// Cookie file forwarded to the downloader
    #[arg(long)]
    pub cookies: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Converts the parsed arguments into the run configuration.
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            split: self.split,
            manifest_dir: self.manifest_dir,
            video_dir: self.video_dir,
            resolution: self.resolution,
            skip_existing: self.skip_existing,
            workers: usize::from(self.workers),
            threads: u32::from(self.threads),
            use_aria2c: !self.no_aria2c,
            suppress_errors: self.suppress_errors,
            max_videos: self.max_videos,
            retry_file: self.failed_videos_file,
            cookies: self.cookies,
        }
    }
}
