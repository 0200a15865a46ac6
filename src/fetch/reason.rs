//! Best-effort failure reasons from the downloader's diagnostic output.
//!
//! The external tool prints a lot of progress noise; the useful part of a
//! failure is usually one line near the end of stderr. The scan walks the
//! output backwards looking for an indicator keyword, then falls back to
//! the last line that is not bracketed progress chatter.

/// Keywords that mark a line as the authoritative failure reason.
const REASON_KEYWORDS: [&str; 4] = ["error", "unavailable", "private", "deleted"];

/// Upper bound on a fallback reason pulled from an arbitrary output line.
const MAX_REASON_LEN: usize = 120;

/// Reason reported when the diagnostic output holds nothing usable.
pub const UNKNOWN_REASON: &str = "unknown error";

/// Extracts a human-readable failure reason from captured stderr.
///
/// Scans lines from the end for one containing an indicator keyword
/// (case-insensitive) and returns it trimmed. With no match, returns the
/// last non-empty line not starting with `[`, truncated to a bounded
/// length. With nothing usable, returns [`UNKNOWN_REASON`].
#[must_use]
pub fn extract_failure_reason(stderr: &str) -> String {
    for line in stderr.lines().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if REASON_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return trimmed.to_string();
        }
    }

    for line in stderr.lines().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('[') {
            continue;
        }
        return truncate_reason(trimmed);
    }

    UNKNOWN_REASON.to_string()
}

fn truncate_reason(line: &str) -> String {
    if line.chars().count() <= MAX_REASON_LEN {
        line.to_string()
    } else {
        line.chars().take(MAX_REASON_LEN).collect()
    }
}
