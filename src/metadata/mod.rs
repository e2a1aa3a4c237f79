//! Capture-time resolution.
//!
//! The pipeline only sees [`TimestampResolver`]; how dates are actually extracted
//! (exiftool arguments, report format, batching) stays behind that seam.

mod exiftool;
pub mod timestamp;

pub use exiftool::{
    EXIFTOOL_BATCH_SIZE, EXIFTOOL_TIMEOUT, ExifTool, PROBE_TIMEOUT, UNKNOWN_SENTINEL, parse_report,
};
pub use timestamp::{TIMESTAMP_FORMAT, Timestamp, file_mod_timestamp, validate_timestamp};

use std::collections::HashMap;
use std::path::PathBuf;

/// Maps base filename -> validated capture timestamp.
pub type TimestampMap = HashMap<String, Timestamp>;

/// Source of capture timestamps for a batch of files.
///
/// Implementations return an entry only for files whose date could be extracted; callers
/// fall back to the modification time for the rest. Keys are base filenames, so base names
/// are assumed unique within one run's input set.
pub trait TimestampResolver {
    fn resolve_timestamps(&self, files: &[PathBuf]) -> TimestampMap;
}

/// A fixed table of dates; answers only for the files it is asked about.
impl TimestampResolver for TimestampMap {
    fn resolve_timestamps(&self, files: &[PathBuf]) -> TimestampMap {
        files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|name| {
                let name = name.to_string_lossy();
                self.get(name.as_ref()).map(|ts| (name.into_owned(), ts.clone()))
            })
            .collect()
    }
}
