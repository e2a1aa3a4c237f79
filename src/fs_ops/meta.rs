//! Carry timestamps and permission bits over to a copied file.
//! Only the copy fallback needs this; a rename keeps the inode as-is.

use anyhow::Result;
use filetime::{FileTime, set_file_times};
use std::fs::{self, Metadata};
use std::path::Path;

use super::helpers::io_error_with_help;

/// Apply `src_meta`'s atime/mtime and (Unix) mode bits to `dest`.
pub(super) fn preserve_metadata(dest: &Path, src_meta: &Metadata) -> Result<()> {
    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    set_file_times(dest, atime, mtime).map_err(io_error_with_help("set file times", dest))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o7777;
        fs::set_permissions(dest, fs::Permissions::from_mode(mode))
            .map_err(io_error_with_help("set permissions", dest))?;
    }
    #[cfg(not(unix))]
    {
        fs::set_permissions(dest, src_meta.permissions())
            .map_err(io_error_with_help("set permissions", dest))?;
    }

    Ok(())
}
