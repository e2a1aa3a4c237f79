//! Rename into place.
//! Refuses to replace an existing destination; on Unix the parent directory is
//! fsynced afterwards (best-effort) so the new entry survives a crash.

use std::fs;
use std::io;
use std::path::Path;

pub(super) fn rename_no_clobber(src: &Path, dest: &Path) -> io::Result<()> {
    // Names are reserved up front, so anything already here came from elsewhere.
    if fs::symlink_metadata(dest).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination appeared after planning",
        ));
    }

    fs::rename(src, dest)?;

    if let Some(parent) = dest.parent() {
        let _ = super::util::fsync_dir(parent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renames_into_free_slot() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.jpg");
        let dest = td.path().join("b.jpg");
        fs::write(&src, b"data").unwrap();
        rename_no_clobber(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"data");
    }

    #[test]
    fn existing_destination_is_left_alone() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.jpg");
        let dest = td.path().join("b.jpg");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();
        let err = rename_no_clobber(&src, &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"old");
        assert!(src.exists());
    }
}
