//! OS-specific file helpers for the log file and the config template.
//! Callers see one API; Unix gets 0600 modes and no-clobber atomic writes,
//! Windows gets the closest std equivalent.

mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{open_log_file_secure_append, set_dir_mode_0700, write_config_secure_new_0600};

#[cfg(not(unix))]
pub use windows::{open_log_file_secure_append, set_dir_mode_0700, write_config_secure_new_0600};
