//! Move planning.
//! Maps each candidate to its timestamp, destination folder and proposed filename.
//!
//! Routing:
//! - JPEG-like -> `<output>/<YYYY_MM_DD>/!orig/`
//! - RAW       -> `<output>/<YYYY_MM_DD>/!orig/` with `raw_to_orig`, else `<output>/<YYYY_MM_DD>/`
//!
//! Filename: `<timestamp>_<original stem><original extension>` (extension case preserved).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::discovery::{CandidateFile, MediaKind};
use crate::metadata::{Timestamp, TimestampMap, file_mod_timestamp};

/// Subfolder receiving JPEG-like files (and RAW with `raw_to_orig`).
pub const ORIG_SUBFOLDER: &str = "!orig";
/// Subfolder created alongside `!orig` for downstream tooling.
pub const JPG_SUBFOLDER: &str = "!jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub file: CandidateFile,
    pub timestamp: Timestamp,
    pub dest_folder: PathBuf,
    pub proposed_name: String,
    /// True when the timestamp came from the modification time.
    pub used_fallback: bool,
}

#[derive(Debug, Default, Clone)]
pub struct Plan {
    pub moves: Vec<PlannedMove>,
    /// Distinct `YYYY_MM_DD` folders touched by `moves`.
    pub date_folders: BTreeSet<String>,
    pub fallback_count: usize,
    pub skipped_count: usize,
}

/// Destination folder for a file of `kind` captured at `timestamp`.
pub fn destination_folder(
    output: &Path,
    timestamp: &Timestamp,
    kind: MediaKind,
    raw_to_orig: bool,
) -> PathBuf {
    let date_folder = output.join(timestamp.date_portion());
    match kind {
        MediaKind::Jpeg => date_folder.join(ORIG_SUBFOLDER),
        MediaKind::Raw if raw_to_orig => date_folder.join(ORIG_SUBFOLDER),
        MediaKind::Raw => date_folder,
    }
}

/// `<timestamp>_<stem><ext>` for the file at `path`.
pub fn proposed_filename(timestamp: &Timestamp, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{timestamp}_{stem}{ext}")
}

/// Plan moves, falling back to each file's modification time when no date was resolved.
pub fn plan_moves(
    files: &[CandidateFile],
    dates: &TimestampMap,
    output: &Path,
    raw_to_orig: bool,
) -> Plan {
    plan_moves_with(files, dates, output, raw_to_orig, file_mod_timestamp)
}

/// Like [`plan_moves`] with an explicit fallback source, for deterministic callers.
pub fn plan_moves_with<F>(
    files: &[CandidateFile],
    dates: &TimestampMap,
    output: &Path,
    raw_to_orig: bool,
    fallback: F,
) -> Plan
where
    F: Fn(&Path) -> Option<Timestamp>,
{
    let mut plan = Plan::default();

    for file in files {
        let (timestamp, used_fallback) = match dates.get(&file.name) {
            Some(ts) => (ts.clone(), false),
            None => match fallback(&file.path) {
                Some(ts) => {
                    debug!(file = %file.name, "Using file modification date");
                    plan.fallback_count += 1;
                    (ts, true)
                }
                None => {
                    warn!(file = %file.name, "No date for file (skipping)");
                    plan.skipped_count += 1;
                    continue;
                }
            },
        };

        plan.date_folders.insert(timestamp.date_portion().to_string());
        let dest_folder = destination_folder(output, &timestamp, file.kind, raw_to_orig);
        let proposed_name = proposed_filename(&timestamp, &file.path);

        plan.moves.push(PlannedMove {
            file: file.clone(),
            timestamp,
            dest_folder,
            proposed_name,
            used_fallback,
        });
    }

    plan
}
