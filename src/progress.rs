//! Progress UI for batch runs.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

/// Builds the progress bar driven by the dispatch aggregation loop.
///
/// Returns a hidden (no-op) bar when `quiet` is set or stderr is not a
/// terminal, so logs and redirected output stay clean.
#[must_use]
pub fn batch_progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} downloading videos")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
