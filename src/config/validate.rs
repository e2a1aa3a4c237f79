//! Startup checks, run before anything is discovered or moved.
//! The input must be an existing directory and the output must not live inside it:
//! a nested output would be rescanned as input on the next run. Output equal to the
//! input (organize in place) and input nested inside output are both fine.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::types::Config;
use crate::errors::OrganizerError;

impl Config {
    /// Input existence check plus [`validate_paths`].
    pub fn validate(&self) -> Result<(), OrganizerError> {
        if !self.input.exists() {
            return Err(OrganizerError::InputNotFound(self.input.clone()));
        }
        if !self.input.is_dir() {
            return Err(OrganizerError::InputNotDirectory(self.input.clone()));
        }
        validate_paths(&self.input, &self.output)
    }
}

/// Reject `output` strictly below `input`, comparing symlink-resolved paths.
pub fn validate_paths(input: &Path, output: &Path) -> Result<(), OrganizerError> {
    let input_real = resolve(input);
    let output_real = resolve(output);
    debug!(input = %input_real.display(), output = %output_real.display(), "resolved paths");

    if output_real != input_real && output_real.starts_with(&input_real) {
        return Err(OrganizerError::UnsafeOutput {
            input: input_real,
            output: output_real,
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest,
/// so a not-yet-created output under a symlinked parent still compares correctly.
/// `..` in the missing tail is applied lexically; nothing there can be a symlink.
fn resolve(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut tail = Vec::new();
    let mut cur = absolute.as_path();
    loop {
        if let Ok(real) = dunce::canonicalize(cur) {
            return tail.iter().rev().fold(real, |mut acc: PathBuf, c: &Component| {
                match c {
                    Component::ParentDir => {
                        acc.pop();
                    }
                    Component::CurDir => {}
                    other => acc.push(other),
                }
                acc
            });
        }
        let mut components = cur.components();
        match components.next_back() {
            Some(last @ (Component::Normal(_) | Component::ParentDir | Component::CurDir)) => {
                tail.push(last);
                cur = components.as_path();
            }
            _ => return absolute,
        }
    }
}
