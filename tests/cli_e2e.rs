//! End-to-end CLI tests for the vidfetch binary.
//!
//! Runs against a stub `yt-dlp` executable placed on PATH: it writes the
//! requested output file and exits 0, unless the URL mentions
//! `unavailable`, in which case it prints a yt-dlp-style error on stderr
//! and exits 1.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const FAKE_YTDLP: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
    if [ "$prev" = "-o" ]; then out="$arg"; fi
    prev="$arg"
done
case "$*" in
    *unavailable*)
        echo "[youtube] Extracting URL" >&2
        echo "ERROR: Video unavailable" >&2
        exit 1
        ;;
esac
mkdir -p "$(dirname "$out")"
echo "video-bytes" > "$out"
exit 0
"#;

/// Installs the stub yt-dlp under `<tmp>/bin` and returns that directory.
fn install_fake_ytdlp(tmp: &Path) -> PathBuf {
    let bin_dir = tmp.join("bin");
    fs::create_dir_all(&bin_dir).unwrap();
    let tool = bin_dir.join("yt-dlp");
    fs::write(&tool, FAKE_YTDLP).unwrap();
    let mut perms = fs::metadata(&tool).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&tool, perms).unwrap();
    bin_dir
}

/// Writes `<tmp>/splits/<split>.csv` with the given rows.
fn write_manifest(tmp: &Path, split: &str, rows: &[(&str, &str)]) -> PathBuf {
    let manifest_dir = tmp.join("splits");
    fs::create_dir_all(&manifest_dir).unwrap();
    let mut content = String::from("video_id,video_url\n");
    for (id, url) in rows {
        content.push_str(&format!("{id},{url}\n"));
    }
    fs::write(manifest_dir.join(format!("{split}.csv")), content).unwrap();
    manifest_dir
}

/// Command with the stub tool on PATH and manifest/video dirs under `tmp`.
fn vidfetch(tmp: &Path, bin_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vidfetch").unwrap();
    let path_var = format!(
        "{}:{}",
        bin_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );
    cmd.env("PATH", path_var)
        .arg("--manifest-dir")
        .arg(tmp.join("splits"))
        .arg("--video-dir")
        .arg(tmp.join("videos"))
        .arg("--no-aria2c");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("vidfetch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulk-download dataset videos"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("vidfetch").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vidfetch"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("vidfetch").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_cookie_file_is_config_error() {
    let mut cmd = Command::cargo_bin("vidfetch").unwrap();
    cmd.args(["--cookies", "/nonexistent/cookies.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cookie file not found"));
}

#[test]
fn test_missing_aria2c_with_acceleration_is_config_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());

    let mut cmd = Command::cargo_bin("vidfetch").unwrap();
    // PATH restricted to the stub dir: yt-dlp resolves, aria2c cannot.
    cmd.env("PATH", &bin_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("aria2c not found"))
        .stderr(predicate::str::contains("--no-aria2c"));
}

#[test]
fn test_missing_manifest_is_config_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    fs::create_dir_all(tmp.path().join("splits")).unwrap();

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}

#[test]
fn test_manifest_missing_column_is_config_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    let manifest_dir = tmp.path().join("splits");
    fs::create_dir_all(&manifest_dir).unwrap();
    fs::write(manifest_dir.join("train.csv"), "video_id,title\na,Some Title\n").unwrap();

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column"));
}

#[test]
fn test_full_run_downloads_and_reports() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    write_manifest(
        tmp.path(),
        "train",
        &[
            ("ok1", "https://example.com/ok1"),
            ("bad1", "https://example.com/unavailable1"),
            ("ok2", "https://example.com/ok2"),
        ],
    );

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train", "--workers", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total in work list: 3"))
        .stdout(predicate::str::contains("Downloaded:         2"))
        .stdout(predicate::str::contains("Failed:             1"))
        .stdout(predicate::str::contains("bad1: ERROR: Video unavailable"));

    assert!(tmp.path().join("videos/360p/ok1.mp4").exists());
    assert!(tmp.path().join("videos/360p/ok2.mp4").exists());
    assert!(!tmp.path().join("videos/360p/bad1.mp4").exists());

    let failure_file = tmp.path().join("videos/failed_videos_train_360p.csv");
    assert!(failure_file.exists());
    let content = fs::read_to_string(&failure_file).unwrap();
    assert!(content.contains("video_id,video_url,reason"));
    assert!(content.contains("bad1,https://example.com/unavailable1,ERROR: Video unavailable"));
}

#[test]
fn test_duplicate_identifiers_processed_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    write_manifest(
        tmp.path(),
        "train",
        &[
            ("ok1", "https://example.com/ok1"),
            ("ok1", "https://example.com/ok1"),
            ("ok1", "https://example.com/ok1"),
        ],
    );

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total in work list: 1"))
        .stdout(predicate::str::contains("Downloaded:         1"));
}

#[test]
fn test_skip_existing_counts_present_outputs() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    write_manifest(
        tmp.path(),
        "train",
        &[
            ("ok1", "https://example.com/ok1"),
            ("ok2", "https://example.com/ok2"),
        ],
    );

    let existing = tmp.path().join("videos/360p/ok1.mp4");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, "already here").unwrap();

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train", "--skip-existing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total in work list: 2"))
        .stdout(predicate::str::contains("Skipped (existing): 1"))
        .stdout(predicate::str::contains("Downloaded:         1"));

    // The pre-existing file was left alone.
    assert_eq!(fs::read_to_string(&existing).unwrap(), "already here");
}

#[test]
fn test_max_videos_truncates_work_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    write_manifest(
        tmp.path(),
        "train",
        &[
            ("ok1", "https://example.com/ok1"),
            ("ok2", "https://example.com/ok2"),
            ("ok3", "https://example.com/ok3"),
        ],
    );

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train", "--max-videos", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total in work list: 2"));

    assert!(tmp.path().join("videos/360p/ok1.mp4").exists());
    assert!(tmp.path().join("videos/360p/ok2.mp4").exists());
    assert!(!tmp.path().join("videos/360p/ok3.mp4").exists());
}

#[test]
fn test_retry_run_filters_to_failed_subset_and_suffixes_output() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    write_manifest(
        tmp.path(),
        "train",
        &[
            ("ok1", "https://example.com/ok1"),
            ("bad1", "https://example.com/unavailable1"),
            ("ok2", "https://example.com/ok2"),
        ],
    );

    // First run: persists bad1 to the failure file.
    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train"])
        .assert()
        .success();

    let failure_file = tmp.path().join("videos/failed_videos_train_360p.csv");
    assert!(failure_file.exists());

    // Retry run: restricted to bad1, which still fails.
    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train"])
        .arg("--failed-videos-file")
        .arg(&failure_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total in work list: 1"))
        .stdout(predicate::str::contains("Failed:             1"));

    // The retry output carries a suffix so the input survives.
    let retry_file = tmp.path().join("videos/failed_videos_train_360p_retry.csv");
    assert!(retry_file.exists());
    let content = fs::read_to_string(&retry_file).unwrap();
    assert!(content.contains("bad1"));
    assert!(!content.contains("ok1"));
    assert!(fs::read_to_string(&failure_file).unwrap().contains("bad1"));
}

#[test]
fn test_run_with_failures_still_exits_zero() {
    let tmp = tempfile::TempDir::new().unwrap();
    let bin_dir = install_fake_ytdlp(tmp.path());
    write_manifest(
        tmp.path(),
        "train",
        &[("bad1", "https://example.com/unavailable1")],
    );

    vidfetch(tmp.path(), &bin_dir)
        .args(["--split", "train"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed:             1"));
}
