//! exiftool-backed timestamp resolver.
//!
//! One process per batch of at most `batch_size` paths, each bounded by a timeout.
//! The tool is asked for a tab-separated report:
//!
//! ```text
//! <filename>\t<DateTimeOriginal>\t<CreateDate>
//! ```
//!
//! with dates pre-formatted via `-d`. Every field is re-validated here regardless.
//!
//! Notes:
//! - A timed-out or unspawnable batch contributes no dates; later batches still run.
//! - stdout/stderr are drained on helper threads so a chatty tool cannot fill a pipe
//!   and stall while we wait on it. On timeout those threads are detached, so the
//!   wait stays bounded even when the tool left a process behind.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};
use wait_timeout::ChildExt;

use super::timestamp::{TIMESTAMP_FORMAT, Timestamp};
use super::{TimestampMap, TimestampResolver};
use crate::errors::OrganizerError;

/// Max number of files per invocation; keeps the command line well under ARG_MAX.
pub const EXIFTOOL_BATCH_SIZE: usize = 5000;
/// Upper bound on a single batch invocation.
pub const EXIFTOOL_TIMEOUT: Duration = Duration::from_secs(300);
/// Upper bound on the `-ver` availability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// What exiftool prints for a tag it could not find.
pub const UNKNOWN_SENTINEL: &str = "-";

#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
    leading_args: Vec<OsString>,
    batch_size: usize,
    timeout: Duration,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            batch_size: EXIFTOOL_BATCH_SIZE,
            timeout: EXIFTOOL_TIMEOUT,
        }
    }

    /// Arguments placed before the report arguments, e.g. a script path when `program`
    /// is an interpreter.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }

    /// Run `exiftool -ver`; returns the reported version on success.
    pub fn check_available(&self) -> Result<String, OrganizerError> {
        let mut cmd = self.command();
        cmd.arg("-ver");
        match run_with_timeout(cmd, PROBE_TIMEOUT) {
            Ok(ProcessOutcome::Exited { status, stdout, .. }) if status.success() => {
                let version = String::from_utf8_lossy(&stdout).trim().to_string();
                debug!(program = %self.program.display(), %version, "exiftool available");
                Ok(version)
            }
            Ok(ProcessOutcome::Exited { status, stderr, .. }) => {
                Err(OrganizerError::ToolUnavailable(format!(
                    "'{} -ver' exited with {}: {}",
                    self.program.display(),
                    status,
                    String::from_utf8_lossy(&stderr).trim()
                )))
            }
            Ok(ProcessOutcome::TimedOut) => Err(OrganizerError::ToolUnavailable(format!(
                "'{} -ver' timed out after {} seconds",
                self.program.display(),
                PROBE_TIMEOUT.as_secs()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OrganizerError::ToolUnavailable(
                format!("'{}' is not installed or not on PATH", self.program.display()),
            )),
            Err(e) => Err(OrganizerError::ToolUnavailable(format!(
                "failed to run '{}': {}",
                self.program.display(),
                e
            ))),
        }
    }

    /// Run a single batch; any failure yields an empty map.
    fn run_batch(&self, batch: &[PathBuf]) -> TimestampMap {
        let mut cmd = self.command();
        cmd.args(["-T", "-d", TIMESTAMP_FORMAT, "-filename", "-DateTimeOriginal", "-CreateDate"]);
        cmd.args(batch);

        let (status, stdout, stderr) = match run_with_timeout(cmd, self.timeout) {
            Ok(ProcessOutcome::Exited { status, stdout, stderr }) => (status, stdout, stderr),
            Ok(ProcessOutcome::TimedOut) => {
                error!(
                    files = batch.len(),
                    timeout_secs = self.timeout.as_secs(),
                    "exiftool timed out; no dates for this batch"
                );
                return TimestampMap::new();
            }
            Err(e) => {
                error!(program = %self.program.display(), error = %e, "failed to run exiftool");
                return TimestampMap::new();
            }
        };

        for line in String::from_utf8_lossy(&stderr).lines() {
            let line = line.trim();
            if !line.is_empty() {
                debug!("exiftool: {line}");
            }
        }
        if !status.success() {
            // exiftool exits non-zero when any file in the batch had no readable metadata;
            // the report for the remaining files is still valid.
            debug!(%status, "exiftool exited with non-zero status");
        }

        parse_report(&String::from_utf8_lossy(&stdout))
    }
}

impl TimestampResolver for ExifTool {
    fn resolve_timestamps(&self, files: &[PathBuf]) -> TimestampMap {
        let mut dates = TimestampMap::with_capacity(files.len());
        for (idx, batch) in files.chunks(self.batch_size).enumerate() {
            debug!(batch = idx, files = batch.len(), "reading metadata batch");
            dates.extend(self.run_batch(batch));
        }
        dates
    }
}

/// Parse the tab-separated report into filename -> timestamp.
///
/// Rows with fewer than two fields are malformed and skipped. The captured date wins over
/// the created date; a field holding [`UNKNOWN_SENTINEL`] counts as absent, and rows
/// where neither date validates are omitted.
pub fn parse_report(report: &str) -> TimestampMap {
    let mut dates = TimestampMap::new();
    for line in report.lines() {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 2 {
            continue;
        }

        // exiftool may print a full path; key on the base name only
        let Some(name) = Path::new(parts[0]).file_name() else {
            warn!(line, "exiftool row without a filename");
            continue;
        };

        let captured = date_field(parts[1]);
        let created = parts.get(2).and_then(|p| date_field(p));
        if let Some(ts) = captured.or(created) {
            dates.insert(name.to_string_lossy().into_owned(), ts);
        }
    }
    dates
}

fn date_field(raw: &str) -> Option<Timestamp> {
    match raw.trim() {
        UNKNOWN_SENTINEL => None,
        value => Timestamp::parse(value),
    }
}

enum ProcessOutcome {
    Exited {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    TimedOut,
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut s) = stream {
            let _ = s.read_to_end(&mut buf);
        }
        buf
    })
}

fn run_with_timeout(mut cmd: Command, timeout: Duration) -> io::Result<ProcessOutcome> {
    let mut child: Child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    match child.wait_timeout(timeout)? {
        Some(status) => Ok(ProcessOutcome::Exited {
            status,
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        }),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            // A grandchild may still hold the pipes open; leave the readers to
            // finish on their own instead of waiting on it.
            drop((stdout, stderr));
            Ok(ProcessOutcome::TimedOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn parses_multiple_rows() {
        let out = format!(
            "IMG_001.jpg\t2024_01_15_143052\t2024_01_15_143052\n\
             IMG_002.JPG\t2024_01_15_143105\t2024_01_15_143105\n\
             IMG_003.cr3\t2024_01_16_091500\t2024_01_16_091500\n\
             IMG_004.CR3\t{UNKNOWN_SENTINEL}\t{UNKNOWN_SENTINEL}\n"
        );
        let dates = parse_report(&out);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates["IMG_002.JPG"], ts("2024_01_15_143105"));
        assert!(!dates.contains_key("IMG_004.CR3"));
    }

    #[test]
    fn prefers_captured_over_created() {
        let dates = parse_report("a.jpg\t2024_01_15_143052\t2020_01_01_000000\n");
        assert_eq!(dates["a.jpg"], ts("2024_01_15_143052"));
    }

    #[test]
    fn falls_back_to_created_when_captured_unknown() {
        let dates = parse_report("a.jpg\t-\t2024_01_15_143052\n");
        assert_eq!(dates["a.jpg"], ts("2024_01_15_143052"));
    }

    #[test]
    fn falls_back_to_created_when_captured_malformed() {
        let dates = parse_report("a.jpg\t2024:01:15 14:30:52\t2024_01_15_143052\n");
        assert_eq!(dates["a.jpg"], ts("2024_01_15_143052"));
    }

    #[test]
    fn two_field_rows_are_accepted() {
        let dates = parse_report("a.jpg\t2024_01_15_143052\n");
        assert_eq!(dates["a.jpg"], ts("2024_01_15_143052"));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let dates = parse_report("garbage line\n\nb.jpg\t2024_01_15_143052\t-\n");
        assert_eq!(dates.len(), 1);
        assert!(dates.contains_key("b.jpg"));
    }

    #[test]
    fn full_paths_are_reduced_to_base_names() {
        let dates = parse_report("/photos/2024/c.nef\t2024_01_15_143052\t-\n");
        assert!(dates.contains_key("c.nef"));
    }

    #[test]
    fn crlf_and_padded_fields_are_tolerated() {
        let dates = parse_report("d.jpg\t 2024_01_15_143052 \t-\r\n");
        assert_eq!(dates["d.jpg"], ts("2024_01_15_143052"));
    }

    #[test]
    fn empty_report_is_empty() {
        assert!(parse_report("").is_empty());
        assert!(parse_report("\n\n").is_empty());
    }

    #[test]
    fn batch_size_is_at_least_one() {
        assert_eq!(ExifTool::new("exiftool").with_batch_size(0).batch_size(), 1);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let tool = ExifTool::new("/definitely/not/here/exiftool");
        let err = tool.check_available().unwrap_err();
        assert!(matches!(err, OrganizerError::ToolUnavailable(_)));
        assert!(err.to_string().contains("not installed"));
    }

    #[test]
    fn missing_program_yields_no_dates() {
        let tool = ExifTool::new("/definitely/not/here/exiftool");
        assert!(tool.resolve_timestamps(&[PathBuf::from("x.jpg")]).is_empty());
    }

    #[test]
    fn empty_input_spawns_nothing() {
        let tool = ExifTool::new("/definitely/not/here/exiftool");
        assert!(tool.resolve_timestamps(&[]).is_empty());
    }
}
