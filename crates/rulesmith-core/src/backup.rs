//! Timestamped backups of files about to be overwritten

use crate::Result;
use chrono::{DateTime, Utc};
use rulesmith_fs::{Error as FsError, NormalizedPath};
use std::fs;

/// `<file>.<YYYYMMDDHHMMSS>.bak`
pub fn backup_path(path: &NormalizedPath, at: DateTime<Utc>) -> NormalizedPath {
    NormalizedPath::new(format!("{}.{}.bak", path, at.format("%Y%m%d%H%M%S")))
}

/// Copy `path` next to itself under a timestamped name.
pub fn create_backup(path: &NormalizedPath) -> Result<NormalizedPath> {
    let backup = backup_path(path, Utc::now());
    fs::copy(path.to_native(), backup.to_native()).map_err(|e| FsError::io(path.to_native(), e))?;
    tracing::info!(original = %path, backup = %backup, "Backed up existing file");
    Ok(backup)
}
