//! Single-file move.
//! Tries a rename first; when that fails for any reason other than an occupied
//! destination, falls back to copy (through a temp file) then delete.

use anyhow::{Result, bail};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::atomic::rename_no_clobber;
use super::copy::safe_copy_and_rename;
use super::helpers::io_error_with_help;
use super::util::is_cross_device;

/// One allocated move, ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTask {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// The allocator had to change the proposed name.
    pub deduplicated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { dest: PathBuf, deduplicated: bool },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// Base name of the source, for reporting.
    pub source_name: String,
    pub outcome: MoveOutcome,
}

impl MoveResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, MoveOutcome::Moved { .. })
    }
}

/// Perform `task`. Never panics and never returns early: every failure becomes a `Failed` outcome.
pub fn move_single_file(task: &MoveTask) -> MoveResult {
    let source_name = task
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| task.source.display().to_string());

    let outcome = match move_file(&task.source, &task.dest) {
        Ok(()) => MoveOutcome::Moved {
            dest: task.dest.clone(),
            deduplicated: task.deduplicated,
        },
        Err(e) => MoveOutcome::Failed {
            error: format!("{e:#}"),
        },
    };
    MoveResult { source_name, outcome }
}

fn move_file(src: &Path, dest: &Path) -> Result<()> {
    let e = match rename_no_clobber(src, dest) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "renamed");
            return Ok(());
        }
        Err(e) => e,
    };

    match e.kind() {
        io::ErrorKind::AlreadyExists => {
            bail!("destination already exists: {}", dest.display())
        }
        io::ErrorKind::NotFound if fs::symlink_metadata(src).is_err() => {
            return Err(io_error_with_help("move file", src)(e));
        }
        _ => {}
    }

    let hint = if is_cross_device(&e) {
        "cross-filesystem; copying instead"
    } else {
        "falling back to copy"
    };
    warn!(file = %src.display(), error = %e, hint, "Rename failed");

    safe_copy_and_rename(src, dest)?;
    fs::remove_file(src).map_err(io_error_with_help("remove original after copy", src))?;
    Ok(())
}
