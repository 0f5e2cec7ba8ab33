//! Atomic output writing shared by the exporters.
//!
//! Text artifacts (CSV, Mermaid, JSON) are written to a temporary file,
//! flushed, and renamed into place so an interrupted run never leaves a
//! truncated output behind.

use crate::error::{Error, Result};
use std::{
    fs,
    io::Write,
    path::Path,
    time::SystemTime,
};
use tracing::debug;

/// Writes a file atomically with optional backup of an existing file.
///
/// # Process
///
/// 1. Creates backup if file exists and backup is enabled
/// 2. Writes content to temporary file
/// 3. Syncs temporary file to disk
/// 4. Atomically renames temporary file to target path
pub(crate) fn write_file_atomic(path: &Path, content: &[u8], backup_existing: bool) -> Result<()> {
    if path.exists() && backup_existing {
        backup_file(path)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    // Ensure data is flushed to disk
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Creates a timestamped backup of an existing file.
fn backup_file(path: &Path) -> Result<()> {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_nanos();

    let filename = path
        .file_name()
        .ok_or_else(|| Error::config("Invalid file path"))?
        .to_string_lossy();

    let backup_name = format!("{filename}.backup.{timestamp}");
    let backup_path = path
        .parent()
        .ok_or_else(|| Error::config("Invalid file path"))?
        .join(backup_name);

    fs::copy(path, &backup_path).map_err(|e| Error::io(&backup_path, e))?;

    debug!("Created backup: {}", backup_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_write_creates_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out.csv");

        write_file_atomic(target.path(), b"a,b\n", false).unwrap();

        target.assert("a,b\n");
        assert!(!temp.child("out.tmp").exists());
    }

    #[test]
    fn test_write_replaces_existing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out.csv");
        target.write_str("old").unwrap();

        write_file_atomic(target.path(), b"new", false).unwrap();

        target.assert("new");
    }

    #[test]
    fn test_write_creates_backup() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out.csv");
        target.write_str("old content").unwrap();

        write_file_atomic(target.path(), b"new content", true).unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();

        assert!(entries.iter().any(|name| name.contains(".backup.")));
    }
}
