//! Core library for `photo_organizer`.
//!
//! Pipeline: discovery -> metadata resolution -> planning -> name allocation -> parallel moves.
//! The binary is a thin shell around [`organize::process_files`]; everything with invariants
//! lives here so it can be exercised directly from tests.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod fs_ops;
pub mod metadata;
pub mod organize;
pub mod output;
pub mod plan;
pub mod platform;
pub mod shutdown;

pub use config::{
    CONFIG_ENV, Config, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor,
    validate_paths,
};
pub use discovery::{CandidateFile, MediaKind, find_files};
pub use errors::OrganizerError;
pub use fs_ops::{
    ExecutionReport, FilenameAllocator, MoveOutcome, MoveResult, MoveTask, execute_moves,
};
pub use metadata::{ExifTool, Timestamp, TimestampMap, TimestampResolver};
pub use organize::{RunSummary, allocate_moves, process_files};
pub use plan::{Plan, PlannedMove, plan_moves};
pub use shutdown::CancellationToken;
