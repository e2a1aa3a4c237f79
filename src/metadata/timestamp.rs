//! Canonical capture timestamps.
//!
//! Every timestamp in the pipeline has the exact lexical shape `YYYY_MM_DD_HHMMSS`.
//! Anything else (the tool's `-` sentinel, blanks, partial dates) is treated as absent.

use chrono::{DateTime, Local};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::SystemTime;

/// strftime pattern producing the canonical shape; also handed to exiftool via `-d`.
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

static TIMESTAMP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}_[0-9]{2}_[0-9]{2}_[0-9]{6}$").expect("static regex"));

/// Return `value` unchanged if it has the canonical shape, otherwise `None`.
pub fn validate_timestamp(value: &str) -> Option<&str> {
    TIMESTAMP_REGEX.is_match(value).then_some(value)
}

/// A validated `YYYY_MM_DD_HHMMSS` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn parse(value: &str) -> Option<Self> {
        validate_timestamp(value).map(|v| Timestamp(v.to_string()))
    }

    /// Convert a filesystem time to the canonical shape in local time.
    pub fn from_system_time(time: SystemTime) -> Self {
        let local: DateTime<Local> = time.into();
        Timestamp(local.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `YYYY_MM_DD`, the name of the date folder.
    pub fn date_portion(&self) -> &str {
        &self.0[..10]
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last-modified time of `path` as a canonical timestamp; `None` if it cannot be read.
pub fn file_mod_timestamp(path: &Path) -> Option<Timestamp> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(Timestamp::from_system_time(modified))
}
