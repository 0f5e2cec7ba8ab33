//! Bulk renaming of the entries of a single directory.
//!
//! Renames are planned first and applied only when the whole plan is free of
//! collisions, so a bad prefix never leaves a directory half-renamed.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// A renaming operation applied to each matching file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOp {
    /// Prepends text to the file name.
    AddPrefix(String),
    /// Inserts text between the file stem and its extension.
    AddSuffix(String),
    /// Strips text from the start of the file name; non-matching names are
    /// skipped.
    RemovePrefix(String),
    /// Strips text from the end of the file stem; non-matching names are
    /// skipped.
    RemoveSuffix(String),
}

impl RenameOp {
    /// Applies the operation to a file name, returning `None` when the name
    /// does not match (and so should be left alone).
    fn apply(&self, name: &str) -> Option<String> {
        match self {
            Self::AddPrefix(text) => Some(format!("{text}{name}")),
            Self::AddSuffix(text) => {
                let (stem, ext) = split_name(name);
                Some(format!("{stem}{text}{ext}"))
            }
            Self::RemovePrefix(text) => name.strip_prefix(text.as_str()).map(str::to_string),
            Self::RemoveSuffix(text) => {
                let (stem, ext) = split_name(name);
                stem.strip_suffix(text.as_str())
                    .map(|stripped| format!("{stripped}{ext}"))
            }
        }
    }
}

/// Splits a file name into stem and extension (extension keeps its dot).
/// Dotfiles like `.gitignore` count as all-stem.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// Options for a bulk rename run.
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Directory whose direct entries are renamed
    pub directory: PathBuf,

    /// Operation applied to each matching name
    pub op: RenameOp,

    /// Optional glob restricting which entries are touched (e.g. `*.jpg`)
    pub pattern: Option<String>,

    /// Plan without touching the filesystem
    pub dry_run: bool,
}

impl RenameOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist, the operation text
    /// is empty, or the glob pattern is invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(Error::config(format!(
                "not a directory: {}",
                self.directory.display()
            )));
        }

        let text = match &self.op {
            RenameOp::AddPrefix(t)
            | RenameOp::AddSuffix(t)
            | RenameOp::RemovePrefix(t)
            | RenameOp::RemoveSuffix(t) => t,
        };
        if text.is_empty() {
            return Err(Error::config("rename text must not be empty"));
        }
        if text.contains('/') || text.contains('\\') {
            return Err(Error::config("rename text must not contain path separators"));
        }

        if let Some(pattern) = &self.pattern {
            Glob::new(pattern)
                .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;
        }

        Ok(())
    }

    fn build_matcher(&self) -> Result<Option<GlobSet>> {
        let Some(pattern) = &self.pattern else {
            return Ok(None);
        };
        let glob = Glob::new(pattern)
            .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build glob set: {e}")))?;
        Ok(Some(set))
    }
}

/// One planned or applied rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    /// Original file name
    pub from: String,
    /// New file name
    pub to: String,
}

/// Plans the renames for a directory without applying them.
///
/// The returned entries are sorted by original name for deterministic output.
///
/// # Errors
///
/// Returns an error if the directory cannot be read, or if any planned
/// target collides with an existing entry or another planned target.
pub fn plan(options: &RenameOptions) -> Result<Vec<RenameEntry>> {
    options.validate()?;
    let matcher = options.build_matcher()?;

    let mut existing = HashSet::new();
    let mut names = Vec::new();
    for entry in fs::read_dir(&options.directory).map_err(|e| Error::io(&options.directory, e))? {
        let entry = entry.map_err(|e| Error::io(&options.directory, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let is_file = entry
            .file_type()
            .map_err(|e| Error::io(entry.path(), e))?
            .is_file();
        existing.insert(name.clone());
        if is_file {
            names.push(name);
        }
    }
    names.sort();

    let mut entries = Vec::new();
    for name in names {
        if let Some(matcher) = &matcher {
            if !matcher.is_match(Path::new(&name)) {
                debug!("Skipping {name} (pattern mismatch)");
                continue;
            }
        }

        let Some(new_name) = options.op.apply(&name) else {
            continue;
        };
        if new_name == name || new_name.is_empty() {
            continue;
        }

        entries.push(RenameEntry {
            from: name,
            to: new_name,
        });
    }

    // Reject the whole plan on any collision, before anything moved. A
    // target that is itself due for renaming still counts: applying in name
    // order would clobber it first.
    let mut planned_targets = HashSet::new();
    for entry in &entries {
        if existing.contains(&entry.to) || !planned_targets.insert(entry.to.clone()) {
            return Err(Error::RenameCollision {
                from: entry.from.clone(),
                to: entry.to.clone(),
            });
        }
    }

    Ok(entries)
}

/// Plans and applies the renames, honoring dry-run mode.
///
/// # Errors
///
/// Returns an error if planning fails or any rename syscall fails.
pub fn run(options: &RenameOptions) -> Result<Vec<RenameEntry>> {
    let entries = plan(options)?;

    if options.dry_run {
        for entry in &entries {
            info!("[dry-run] Would rename: {} -> {}", entry.from, entry.to);
        }
        return Ok(entries);
    }

    for entry in &entries {
        let from = options.directory.join(&entry.from);
        let to = options.directory.join(&entry.to);
        fs::rename(&from, &to).map_err(|e| Error::io(&from, e))?;
        info!("Renamed: {} -> {}", entry.from, entry.to);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn options(dir: &Path, op: RenameOp) -> RenameOptions {
        RenameOptions {
            directory: dir.to_path_buf(),
            op,
            pattern: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("photo.jpg"), ("photo", ".jpg"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name(".gitignore"), (".gitignore", ""));
    }

    #[test]
    fn test_add_prefix() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").touch().unwrap();
        temp.child("b.txt").touch().unwrap();

        let renamed = run(&options(temp.path(), RenameOp::AddPrefix("new_".into()))).unwrap();

        assert_eq!(renamed.len(), 2);
        assert!(temp.child("new_a.txt").exists());
        assert!(temp.child("new_b.txt").exists());
        assert!(!temp.child("a.txt").exists());
    }

    #[test]
    fn test_add_suffix_before_extension() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("photo.jpg").touch().unwrap();

        run(&options(temp.path(), RenameOp::AddSuffix("_v2".into()))).unwrap();

        assert!(temp.child("photo_v2.jpg").exists());
    }

    #[test]
    fn test_remove_prefix_skips_nonmatching() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("IMG_001.jpg").touch().unwrap();
        temp.child("other.jpg").touch().unwrap();

        let renamed = run(&options(temp.path(), RenameOp::RemovePrefix("IMG_".into()))).unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(temp.child("001.jpg").exists());
        assert!(temp.child("other.jpg").exists());
    }

    #[test]
    fn test_remove_suffix_keeps_extension() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("report_draft.txt").touch().unwrap();

        run(&options(temp.path(), RenameOp::RemoveSuffix("_draft".into()))).unwrap();

        assert!(temp.child("report.txt").exists());
    }

    #[test]
    fn test_pattern_filter() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.jpg").touch().unwrap();
        temp.child("b.txt").touch().unwrap();

        let mut opts = options(temp.path(), RenameOp::AddPrefix("x_".into()));
        opts.pattern = Some("*.jpg".into());
        let renamed = run(&opts).unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(temp.child("x_a.jpg").exists());
        assert!(temp.child("b.txt").exists());
    }

    #[test]
    fn test_collision_aborts_whole_plan() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").touch().unwrap();
        temp.child("new_a.txt").touch().unwrap();

        let result = run(&options(temp.path(), RenameOp::AddPrefix("new_".into())));

        assert!(matches!(result, Err(Error::RenameCollision { .. })));
        // Nothing moved.
        assert!(temp.child("a.txt").exists());
    }

    #[test]
    fn test_chained_target_counts_as_collision() {
        // a.txt -> aa.txt while aa.txt itself is due for renaming: applying
        // in name order would clobber it, so the plan is rejected.
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").touch().unwrap();
        temp.child("aa.txt").touch().unwrap();

        let result = plan(&options(temp.path(), RenameOp::AddPrefix("a".into())));
        assert!(matches!(result, Err(Error::RenameCollision { .. })));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").touch().unwrap();

        let mut opts = options(temp.path(), RenameOp::AddPrefix("x_".into()));
        opts.dry_run = true;
        let renamed = run(&opts).unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(temp.child("a.txt").exists());
        assert!(!temp.child("x_a.txt").exists());
    }

    #[test]
    fn test_directories_are_left_alone() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("subdir").create_dir_all().unwrap();
        temp.child("file.txt").touch().unwrap();

        let renamed = run(&options(temp.path(), RenameOp::AddPrefix("x_".into()))).unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(temp.child("subdir").exists());
    }

    #[test]
    fn test_empty_text_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = run(&options(temp.path(), RenameOp::AddPrefix(String::new())));
        assert!(result.is_err());
    }
}
