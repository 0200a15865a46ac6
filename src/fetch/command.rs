//! External tool discovery and invocation argument construction.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::config::RunConfig;
use crate::worklist::DownloadTask;

/// Format sort passed to the downloader. Prefers h264/m4a so the output
/// plays in QuickTime and decodes fast.
const FORMAT_SORT: &str = "vcodec:h264,res,acodec:m4a";

/// Errors resolving the external tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The downloader binary is not on PATH.
    #[error("yt-dlp not found on PATH; install it from https://github.com/yt-dlp/yt-dlp")]
    YtDlpMissing,

    /// Acceleration is enabled but the accelerator binary is not on PATH.
    #[error("aria2c not found on PATH; install it or pass --no-aria2c to disable acceleration")]
    Aria2cMissing,
}

/// Resolved external binaries for a run.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    /// Path to the yt-dlp binary.
    pub ytdlp: PathBuf,
    /// Path to the aria2c binary, when acceleration is enabled.
    pub aria2c: Option<PathBuf>,
}

impl ToolPaths {
    /// Resolves `yt-dlp` on PATH, and `aria2c` when acceleration is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] naming the missing binary. The aria2c error
    /// names `--no-aria2c` as the remedy.
    pub fn discover(use_aria2c: bool) -> Result<Self, ToolError> {
        let ytdlp = which::which("yt-dlp").map_err(|_| ToolError::YtDlpMissing)?;
        let aria2c = if use_aria2c {
            Some(which::which("aria2c").map_err(|_| ToolError::Aria2cMissing)?)
        } else {
            None
        };

        debug!(ytdlp = %ytdlp.display(), aria2c = ?aria2c, "external tools resolved");
        Ok(Self { ytdlp, aria2c })
    }
}

/// Builds the downloader argument vector for one task.
///
/// The URL goes last, after `--`, so it can never be read as a flag.
#[must_use]
pub fn build_args(task: &DownloadTask, config: &RunConfig, tools: &ToolPaths) -> Vec<OsString> {
    let height = config.resolution.height();
    let mut args: Vec<OsString> = vec![
        "-S".into(),
        FORMAT_SORT.into(),
        "-f".into(),
        format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]").into(),
        "--merge-output-format".into(),
        "mp4".into(),
        "-o".into(),
        task.output_path.clone().into_os_string(),
    ];

    if let Some(aria2c) = &tools.aria2c {
        args.push("--downloader".into());
        args.push(aria2c.clone().into_os_string());
        args.push("--downloader-args".into());
        args.push(format!("aria2c:-x {threads} -k 1M", threads = config.threads).into());
    } else {
        args.push("--concurrent-fragments".into());
        args.push(config.threads.to_string().into());
    }

    if config.suppress_errors {
        args.push("--no-warnings".into());
        args.push("--ignore-errors".into());
    }

    if let Some(cookies) = &config.cookies {
        args.push("--cookies".into());
        args.push(cookies.clone().into_os_string());
    }

    args.push("--".into());
    args.push(task.video_url.clone().into());
    args
}
