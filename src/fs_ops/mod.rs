//! Filesystem side of a run: folder creation, name allocation and the moves themselves.

mod atomic;
mod copy;
mod duplicate;
mod executor;
mod file_move;
mod folders;
mod helpers;
mod io_copy;
mod meta;
mod util;

pub use copy::safe_copy_and_rename;
pub use duplicate::{FilenameAllocator, MAX_DUPLICATE_SUFFIX, split_name};
pub use executor::{DEFAULT_WORKERS, ExecutionReport, MAX_WORKERS, execute_moves};
pub use file_move::{MoveOutcome, MoveResult, MoveTask, move_single_file};
pub use folders::ensure_date_folders;
pub use helpers::{io_error_with_help, io_error_with_help_io};
