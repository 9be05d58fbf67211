//! Utility functions for logging, date stamps and output file naming.
//!
//! - String truncation for log previews
//! - `YYYYMMDD` stamps for output file names
//! - Collision-free numbered file names
//! - File system validation for output directories

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and byte count appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Today's local date as `YYYYMMDD`.
pub fn date_stamp() -> String {
    stamp_for(Local::now().date_naive())
}

pub fn stamp_for(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// First unused `{dir}/{prefix}_{stamp}_{NN}` name.
///
/// The counter starts at `01` and is bumped until no file exists with any of
/// `extensions` appended. The returned path has no extension; callers add one.
///
/// # Arguments
///
/// * `dir` - Directory to probe
/// * `prefix` - File name prefix, such as `raw` or `data`
/// * `stamp` - Date stamp, usually from [`date_stamp`]
/// * `extensions` - Every extension that claims a counter value
///
/// # Errors
///
/// Returns an error if the existence check itself fails (for example, permission
/// denied on `dir`).
#[instrument(level = "debug", skip_all, fields(dir = %dir.display(), %prefix, %stamp))]
pub async fn next_available_stem(
    dir: &Path,
    prefix: &str,
    stamp: &str,
    extensions: &[&str],
) -> Result<PathBuf, Box<dyn Error>> {
    let mut counter = 1u32;
    loop {
        let stem = dir.join(format!("{prefix}_{stamp}_{counter:02}"));
        let mut taken = false;
        for ext in extensions {
            if fs::try_exists(stem.with_extension(ext)).await? {
                taken = true;
                break;
            }
        }
        if !taken {
            debug!(stem = %stem.display(), "Picked output name");
            return Ok(stem);
        }
        counter += 1;
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then creates and immediately
/// deletes a probe file.
///
/// # Arguments
///
/// * `path` - The directory path to validate
///
/// # Returns
///
/// `Ok(())` if the directory exists and is writable.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert_eq!(result, "é…(+18 bytes)");
    }

    #[test]
    fn test_stamp_for() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(stamp_for(date), "20240501");
        assert_eq!(date_stamp().len(), 8);
    }

    #[tokio::test]
    async fn test_next_available_stem_starts_at_01() {
        let dir = tempfile::tempdir().unwrap();
        let stem = next_available_stem(dir.path(), "raw", "20240501", &["json"])
            .await
            .unwrap();
        assert_eq!(stem, dir.path().join("raw_20240501_01"));
    }

    #[tokio::test]
    async fn test_next_available_stem_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data_20240501_01.jsonl"), "").unwrap();
        std::fs::write(dir.path().join("data_20240501_02.json"), "").unwrap();

        let stem = next_available_stem(dir.path(), "data", "20240501", &["json", "jsonl"])
            .await
            .unwrap();
        assert_eq!(stem, dir.path().join("data_20240501_03"));

        let only_json = next_available_stem(dir.path(), "data", "20240501", &["json"])
            .await
            .unwrap();
        assert_eq!(only_json, dir.path().join("data_20240501_01"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
