// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Working directory management.
//!
//! Every trial starts from an empty workspace so it never observes files left
//! behind by a previous trial. Cleanup is best-effort: an entry that cannot be
//! removed is logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::WorkspaceConfig;
use crate::error::{LakeError, LakeResult};

/// Outcome of a [`clear_folder`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    /// Entries removed
    pub removed: usize,
    /// Entries that could not be removed
    pub failed: usize,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Clear the contents of a folder without deleting the folder itself.
///
/// Creates the folder if it does not exist. Files and symlinks are unlinked,
/// directories are removed recursively. A failure on one entry does not stop
/// the remaining entries from being removed.
pub fn clear_folder(path: impl AsRef<Path>) -> LakeResult<CleanupReport> {
    let path = path.as_ref();
    let mut report = CleanupReport::default();

    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| LakeError::Io {
            context: "creating workspace folder",
            source: e,
        })?;
        debug!(path = %path.display(), "Created workspace folder");
        return Ok(report);
    }

    let entries = fs::read_dir(path).map_err(|e| LakeError::Io {
        context: "listing workspace folder",
        source: e,
    })?;

    for entry in entries {
        let entry_path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read folder entry");
                report.failed += 1;
                continue;
            }
        };

        match remove_entry(&entry_path) {
            Ok(()) => report.removed += 1,
            Err(e) => {
                warn!(path = %entry_path.display(), reason = %e, "Failed to delete entry");
                report.failed += 1;
            }
        }
    }

    debug!(
        path = %path.display(),
        removed = report.removed,
        failed = report.failed,
        "Cleared workspace folder"
    );
    Ok(report)
}

fn remove_entry(path: &Path) -> std::io::Result<()> {
    // symlink_metadata so a link to a directory is unlinked, not followed
    let file_type = fs::symlink_metadata(path)?.file_type();
    if file_type.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// The on-disk area used by one benchmark run.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    table_path: PathBuf,
    parquet_path: PathBuf,
}

impl Workspace {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            root: config.root.clone(),
            table_path: config.root.join(&config.table_dir),
            parquet_path: config.root.join(&config.parquet_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the Delta table (log plus data files).
    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    /// Directory holding standalone Parquet files.
    pub fn parquet_path(&self) -> &Path {
        &self.parquet_path
    }

    /// Empty the whole workspace, including both subdirectories.
    pub fn reset(&self) -> LakeResult<CleanupReport> {
        clear_folder(&self.root)
    }

    /// Empty only the table directory. Reports under the root survive.
    pub fn reset_table(&self) -> LakeResult<CleanupReport> {
        clear_folder(&self.table_path)
    }

    /// Empty only the Parquet directory.
    pub fn reset_parquet(&self) -> LakeResult<CleanupReport> {
        clear_folder(&self.parquet_path)
    }
}
