//! Copy-then-rename for moves that cannot be a single rename.
//! The data lands in a hidden temp file next to the destination and only appears
//! under its final name once complete, so a crash never leaves a truncated photo.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use super::atomic::rename_no_clobber;
use super::helpers::{io_error_with_help, io_error_with_help_io};
use super::{io_copy, meta, util};

/// Copy `src` to `dest` through a temp file, then apply the source's metadata.
/// The source is left in place; removing it is the caller's decision.
pub fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat source", src))?;

    let tmp = util::unique_temp_path(dest_dir);
    let bytes = match io_copy::copy_streaming(src, &tmp) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(io_error_with_help("copy to temporary file", &tmp)(e));
        }
    };

    if let Err(e) = meta::preserve_metadata(&tmp, &src_meta) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = rename_no_clobber(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error_with_help_io("rename temporary file into place", dest)(e))
            .with_context(|| format!("copy '{}' -> '{}'", src.display(), dest.display()));
    }

    Ok(bytes)
}
