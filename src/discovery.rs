//! Candidate discovery.
//! Lists the direct children of the input folder that are supported images,
//! in a stable case-folded order so repeated runs plan identically.
//!
//! Notes:
//! - Never recurses: date folders created under an in-place output are not rediscovered.
//! - An unreadable folder is logged and treated as empty; existence is checked upfront
//!   by the caller, so reaching here with a missing folder is not fatal.

use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

/// RAW extensions (lowercase, without dot).
pub const RAW_EXTENSIONS: &[&str] = &["cr3", "dng", "arw", "nef", "orf", "raf", "rw2"];
/// JPEG-like extensions (lowercase, without dot).
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Jpeg,
    Raw,
}

impl MediaKind {
    /// Classify by extension, case-insensitively. `None` for unsupported files.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if JPEG_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Jpeg)
        } else if RAW_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Raw)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A supported image found in the input folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// Base filename, the key used to look up resolved timestamps.
    pub name: String,
    pub kind: MediaKind,
}

impl CandidateFile {
    /// Build a candidate from any path with a supported extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path)?;
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { path, name, kind })
    }
}

/// Find all supported images directly inside `input`, sorted by case-folded name.
pub fn find_files(input: &Path) -> Vec<CandidateFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                error!(path = %input.display(), error = %e, "Error reading directory");
                return Vec::new();
            }
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(candidate) = CandidateFile::from_path(entry.into_path()) {
            files.push(candidate);
        }
    }

    files.sort_by_cached_key(|f| (f.name.to_lowercase(), f.name.clone()));
    debug!(input = %input.display(), count = files.len(), "discovered candidates");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn classifies_extensions_case_insensitively() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Jpeg));
        assert_eq!(MediaKind::from_extension("jpeg"), Some(MediaKind::Jpeg));
        assert_eq!(MediaKind::from_extension("Cr3"), Some(MediaKind::Raw));
        assert_eq!(MediaKind::from_extension("rw2"), Some(MediaKind::Raw));
        assert_eq!(MediaKind::from_extension("png"), None);
        assert_eq!(MediaKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn extension_tables_are_lowercase_and_disjoint() {
        for ext in RAW_EXTENSIONS.iter().chain(JPEG_EXTENSIONS) {
            assert_eq!(*ext, ext.to_ascii_lowercase());
        }
        assert!(RAW_EXTENSIONS.iter().all(|e| !JPEG_EXTENSIONS.contains(e)));
    }

    #[test]
    fn finds_supported_and_ignores_others() {
        let td = tempdir().unwrap();
        for n in ["IMG_001.jpg", "IMG_002.JPG", "IMG_004.cr3", "IMG_011.rw2", "notes.txt", "doc.pdf"] {
            touch(td.path(), n);
        }
        let names: Vec<_> = find_files(td.path()).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["IMG_001.jpg", "IMG_002.JPG", "IMG_004.cr3", "IMG_011.rw2"]);
    }

    #[test]
    fn ordering_is_case_folded() {
        let td = tempdir().unwrap();
        for n in ["b.jpg", "A.jpg", "c.NEF", "B2.jpg"] {
            touch(td.path(), n);
        }
        let names: Vec<_> = find_files(td.path()).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["A.jpg", "b.jpg", "B2.jpg", "c.NEF"]);
    }

    #[test]
    fn does_not_recurse() {
        let td = tempdir().unwrap();
        touch(td.path(), "top.jpg");
        let sub = td.path().join("2024_01_15").join("!orig");
        fs::create_dir_all(&sub).unwrap();
        touch(&sub, "nested.jpg");
        // a directory with an image-like name is not a file
        fs::create_dir_all(td.path().join("folder.jpg")).unwrap();

        let files = find_files(td.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "top.jpg");
        assert_eq!(files[0].kind, MediaKind::Jpeg);
    }

    #[test]
    fn empty_and_missing_directories_yield_nothing() {
        let td = tempdir().unwrap();
        assert!(find_files(td.path()).is_empty());
        assert!(find_files(&td.path().join("missing")).is_empty());
    }
}
