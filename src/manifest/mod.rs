//! Split manifest and retry-subset loading.
//!
//! A split manifest is a CSV file named `<split>.csv` carrying `video_id`
//! and `video_url` columns, one row per referenced video. A retry subset is
//! the failure CSV a previous run persisted, read back for its `video_id`
//! column only so a rerun can be restricted to what failed.

mod error;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, instrument};

pub use error::ManifestError;

/// Column holding the video identifier.
const ID_COLUMN: &str = "video_id";

/// Column holding the source URL.
const URL_COLUMN: &str = "video_url";

/// Dataset split selecting which manifest to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Split {
    Train,
    Test,
    #[value(name = "test_silent")]
    TestSilent,
    #[value(name = "test_expert")]
    TestExpert,
}

impl Split {
    /// Split name as it appears in manifest filenames and failure files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
            Self::TestSilent => "test_silent",
            Self::TestExpert => "test_expert",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One manifest row: a video identifier and where to fetch it from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoRecord {
    /// Unique video identifier.
    pub video_id: String,
    /// Source URL handed to the downloader.
    pub video_url: String,
}

/// Loads all records of a split manifest, in file order.
///
/// The header row must contain both `video_id` and `video_url`; extra
/// columns are ignored. No deduplication happens here — that is the
/// work-list builder's job.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] if the file cannot be opened or a row is
/// malformed, and [`ManifestError::MissingColumn`] if a required column is
/// absent.
#[instrument]
pub fn load_split(path: &Path) -> Result<Vec<VideoRecord>, ManifestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| ManifestError::read(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| ManifestError::read(path, e))?
        .clone();
    ensure_column(&headers, ID_COLUMN, path)?;
    ensure_column(&headers, URL_COLUMN, path)?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: VideoRecord = row.map_err(|e| ManifestError::read(path, e))?;
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "manifest loaded");
    Ok(records)
}

/// Row shape for reading identifiers back out of a failure file.
#[derive(Debug, Deserialize)]
struct RetryRow {
    video_id: String,
}

/// Loads the identifier set from a previously persisted failure file.
///
/// Only the `video_id` column is consulted; url/reason columns written by
/// the reporter are ignored.
///
/// # Errors
///
/// Returns [`ManifestError::MissingColumn`] if the file has no `video_id`
/// column, or [`ManifestError::Read`] on IO/parse failure.
#[instrument]
pub fn load_retry_subset(path: &Path) -> Result<HashSet<String>, ManifestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| ManifestError::read(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| ManifestError::read(path, e))?
        .clone();
    ensure_column(&headers, ID_COLUMN, path)?;

    let mut subset = HashSet::new();
    for row in reader.deserialize() {
        let record: RetryRow = row.map_err(|e| ManifestError::read(path, e))?;
        subset.insert(record.video_id);
    }

    debug!(path = %path.display(), ids = subset.len(), "retry subset loaded");
    Ok(subset)
}

fn ensure_column(
    headers: &csv::StringRecord,
    column: &'static str,
    path: &Path,
) -> Result<(), ManifestError> {
    if headers.iter().any(|h| h == column) {
        Ok(())
    } else {
        Err(ManifestError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_split_as_str_matches_dataset_names() {
        assert_eq!(Split::Train.as_str(), "train");
        assert_eq!(Split::Test.as_str(), "test");
        assert_eq!(Split::TestSilent.as_str(), "test_silent");
        assert_eq!(Split::TestExpert.as_str(), "test_expert");
    }

    #[test]
    fn test_load_split_reads_rows_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "train.csv",
            "video_id,video_url\na,https://example.com/a\nb,https://example.com/b\n",
        );

        let records = load_split(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].video_id, "a");
        assert_eq!(records[0].video_url, "https://example.com/a");
        assert_eq!(records[1].video_id, "b");
    }

    #[test]
    fn test_load_split_ignores_extra_columns() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "train.csv",
            "video_id,title,video_url\na,Some Title,https://example.com/a\n",
        );

        let records = load_split(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video_url, "https://example.com/a");
    }

    #[test]
    fn test_load_split_missing_url_column_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "train.csv", "video_id,title\na,Some Title\n");

        let err = load_split(&path).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingColumn {
                column: "video_url",
                ..
            }
        ));
    }

    #[test]
    fn test_load_split_missing_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_split(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn test_load_retry_subset_collects_ids() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "failed.csv",
            "video_id,video_url,reason\na,https://example.com/a,ERROR: gone\nc,https://example.com/c,timeout\n",
        );

        let subset = load_retry_subset(&path).unwrap();
        assert_eq!(subset.len(), 2);
        assert!(subset.contains("a"));
        assert!(subset.contains("c"));
    }

    #[test]
    fn test_load_retry_subset_missing_id_column_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "failed.csv", "url,reason\nhttps://a,boom\n");

        let err = load_retry_subset(&path).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingColumn {
                column: "video_id",
                ..
            }
        ));
    }
}
