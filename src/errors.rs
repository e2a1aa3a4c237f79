//! Typed error definitions for photo_organizer.
//! Only fatal preconditions are typed here; per-batch and per-file problems are
//! logged and counted by the pipeline instead of being returned as errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("Input folder does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Input path is not a directory: {0}")]
    InputNotDirectory(PathBuf),

    #[error("Output folder '{output}' cannot be inside input folder '{input}'")]
    UnsafeOutput { input: PathBuf, output: PathBuf },

    #[error("exiftool is not available: {0}")]
    ToolUnavailable(String),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl OrganizerError {
    /// Stable numeric code, emitted as a structured log field.
    pub fn code(&self) -> u16 {
        match self {
            OrganizerError::InputNotFound(_) => 10,
            OrganizerError::InputNotDirectory(_) => 11,
            OrganizerError::UnsafeOutput { .. } => 20,
            OrganizerError::ToolUnavailable(_) => 30,
            OrganizerError::Interrupted => 130,
        }
    }
}
