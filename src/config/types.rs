//! Runtime settings and verbosity levels.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::fs_ops::DEFAULT_WORKERS;
use crate::metadata::{EXIFTOOL_BATCH_SIZE, EXIFTOOL_TIMEOUT};

/// Program-defined verbosity levels exposed to users and the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    #[default]
    Normal,
    /// Per-file detail
    Info,
    /// Everything
    Debug,
}

impl LogLevel {
    /// Case-insensitive; accepts a few common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Settings for one organize run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder scanned for photos (one level deep)
    pub input: PathBuf,
    /// Root of the date folders; often the same as `input`
    pub output: PathBuf,
    /// Put RAW files in `!orig` alongside JPEGs
    pub raw_to_orig: bool,
    /// Plan and print, touch nothing
    pub dry_run: bool,
    pub workers: usize,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    /// exiftool program name or path
    pub exiftool: PathBuf,
    pub exiftool_timeout: Duration,
    pub batch_size: usize,
    /// JSON log lines instead of compact text
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("."),
            raw_to_orig: false,
            dry_run: false,
            workers: DEFAULT_WORKERS,
            log_level: LogLevel::Normal,
            log_file: None,
            exiftool: PathBuf::from("exiftool"),
            exiftool_timeout: EXIFTOOL_TIMEOUT,
            batch_size: EXIFTOOL_BATCH_SIZE,
            json: false,
        }
    }
}

impl Config {
    /// Explicit input/output, everything else default.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }
}
