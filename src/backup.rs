//! Backup management for the data file. A copy of the current file is taken before every save.

use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Copies the file at `path` into the backups directory.
    ///
    /// The filename format is `{stem}.YYYY-MM-DD-NNN.{ext}` where NNN is a sequence number, e.g.
    /// `verbrauchsdaten.2025-12-14-001.csv`. Old backups are rotated, keeping only
    /// `backup_copies` files.
    ///
    /// Returns the path to the created backup file, or `None` if there was nothing to back up.
    pub async fn save_copy(&self, path: &Path) -> Result<Option<PathBuf>> {
        if !path.is_file() {
            return Ok(None);
        }
        let (prefix, extension) = split_name(path);
        let date = today();
        let seq = self.next_sequence_number(&prefix, &date, &extension).await?;
        let filename = if extension.is_empty() {
            format!("{prefix}.{date}-{seq:03}")
        } else {
            format!("{prefix}.{date}-{seq:03}.{extension}")
        };
        let backup_path = self.backups_dir.join(&filename);

        utils::copy(path, &backup_path).await?;

        self.rotate(&prefix, &extension).await?;

        Ok(Some(backup_path))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str, extension: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;
        for name in self.file_names().await? {
            if let Some(seq) = parse_sequence_number(&name, prefix, date, extension) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str, extension: &str) -> Result<()> {
        let mut files: Vec<String> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix, extension))
            .collect();

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(name)).await?;
        }

        Ok(())
    }

    async fn file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Splits `verbrauchsdaten.csv` into `("verbrauchsdaten", "csv")`.
fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "data".to_string());
    let extension = path
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    (stem, extension)
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str, extension: &str) -> Option<u32> {
    // Pattern: {prefix}.{date}-{NNN}.{ext} or {prefix}.{date}-{NNN} (no extension)
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    let seq_str = if extension.is_empty() {
        remainder
    } else {
        remainder.strip_suffix(&format!(".{extension}"))?
    };
    seq_str.parse().ok()
}

/// Checks if a filename is a backup file with the given prefix and extension.
fn is_backup_file(filename: &str, prefix: &str, extension: &str) -> bool {
    let starts_ok = filename.starts_with(&format!("{prefix}."));
    let ends_ok = extension.is_empty() || filename.ends_with(&format!(".{extension}"));
    starts_ok && ends_ok
}
