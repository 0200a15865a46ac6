//! Error type for manifest and retry-subset loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading a split manifest or retry subset.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file could not be opened or a row could not be parsed.
    #[error("could not read {path}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying CSV/IO error.
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row.
    #[error("{path} is missing required column '{column}'")]
    MissingColumn {
        /// File with the bad header.
        path: PathBuf,
        /// Name of the absent column.
        column: &'static str,
    },
}

impl ManifestError {
    pub(crate) fn read(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
