//! Duplicate-name resolution across a whole run.
//!
//! Policy:
//! - A proposed name that is free in its folder is claimed unchanged.
//! - Otherwise probe `stem_n.ext` for n = 2.. up to [`MAX_DUPLICATE_SUFFIX`] and claim the first free one.
//!
//! "Free" means absent from both the folder's on-disk listing (read once, on first
//! use, then cached) and the names this allocator has already handed out. Because
//! claims are recorded before any file is written, the allocator must run in one
//! sequential pass before moves start, and a dry run sees the same names a real run would.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, trace};

/// Highest numeric suffix probed before giving up.
pub const MAX_DUPLICATE_SUFFIX: u32 = 99_999;

#[derive(Debug, Default)]
pub struct FilenameAllocator {
    existing: HashMap<PathBuf, HashSet<String>>,
    allocated: HashMap<PathBuf, HashSet<String>>,
}

impl FilenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a name in `folder` derived from `proposed`, unique for this run.
    pub fn allocate(&mut self, folder: &Path, proposed: &str) -> String {
        let existing = self
            .existing
            .entry(folder.to_path_buf())
            .or_insert_with(|| list_existing(folder));
        let allocated = self.allocated.entry(folder.to_path_buf()).or_default();
        let is_free = |name: &str| !existing.contains(name) && !allocated.contains(name);

        if is_free(proposed) {
            allocated.insert(proposed.to_string());
            return proposed.to_string();
        }

        let (stem, suffix) = split_name(proposed);
        let mut n: u32 = 2;
        while n <= MAX_DUPLICATE_SUFFIX {
            let candidate = format!("{stem}_{n}{suffix}");
            if is_free(&candidate) {
                if n > 3 {
                    trace!(name = proposed, dir = %folder.display(), n, "duplicate: multiple collisions");
                }
                allocated.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }

        error!(name = proposed, dir = %folder.display(), "Too many duplicates");
        let fallback = format!("{stem}_{n}{suffix}");
        allocated.insert(fallback.clone());
        fallback
    }
}

/// Split at the last `.`; a name whose only dot is the leading one has no suffix.
///
/// Examples:
/// - "IMG_001.CR3" -> ("IMG_001", ".CR3")
/// - "archive.tar.gz" -> ("archive.tar", ".gz")
/// - ".hidden" -> (".hidden", "")
/// - "README" -> ("README", "")
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    }
}

/// Regular files currently in `folder`; a missing or unreadable folder counts as empty.
fn list_existing(folder: &Path) -> HashSet<String> {
    let Ok(entries) = fs::read_dir(folder) else {
        return HashSet::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn splits_names() {
        assert_eq!(split_name("IMG_001.CR3"), ("IMG_001", ".CR3"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name(".hidden"), (".hidden", ""));
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name("trailing."), ("trailing", "."));
    }

    #[test]
    fn free_name_is_returned_unchanged() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(td.path(), "photo.jpg"), "photo.jpg");
    }

    #[test]
    fn repeated_allocation_counts_up() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        let got: Vec<_> = (0..5).map(|_| alloc.allocate(td.path(), "photo.jpg")).collect();
        assert_eq!(
            got,
            vec!["photo.jpg", "photo_2.jpg", "photo_3.jpg", "photo_4.jpg", "photo_5.jpg"]
        );
    }

    #[test]
    fn existing_files_are_respected() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("photo.jpg"), b"1").unwrap();
        fs::write(td.path().join("photo_2.jpg"), b"2").unwrap();
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(td.path(), "photo.jpg"), "photo_3.jpg");
        assert_eq!(alloc.allocate(td.path(), "photo.jpg"), "photo_4.jpg");
    }

    #[test]
    fn listing_is_cached_after_first_query() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(td.path(), "a.jpg"), "a.jpg");
        // created behind the allocator's back: not seen
        fs::write(td.path().join("b.jpg"), b"x").unwrap();
        assert_eq!(alloc.allocate(td.path(), "b.jpg"), "b.jpg");
    }

    #[test]
    fn folders_are_independent() {
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(&a, "x.jpg"), "x.jpg");
        assert_eq!(alloc.allocate(&b, "x.jpg"), "x.jpg");
        assert_eq!(alloc.allocate(&a, "x.jpg"), "x_2.jpg");
    }

    #[test]
    fn different_extensions_do_not_collide() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(td.path(), "x.jpg"), "x.jpg");
        assert_eq!(alloc.allocate(td.path(), "x.JPG"), "x.JPG");
        assert_eq!(alloc.allocate(td.path(), "x.cr3"), "x.cr3");
    }

    #[test]
    fn extension_case_is_preserved_in_suffixed_name() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        alloc.allocate(td.path(), "IMG.CR3");
        assert_eq!(alloc.allocate(td.path(), "IMG.CR3"), "IMG_2.CR3");
    }

    #[test]
    fn names_without_suffix_and_hidden_names() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        alloc.allocate(td.path(), "noext");
        assert_eq!(alloc.allocate(td.path(), "noext"), "noext_2");
        alloc.allocate(td.path(), ".hidden");
        assert_eq!(alloc.allocate(td.path(), ".hidden"), ".hidden_2");
    }

    #[test]
    fn nonexistent_folder_has_no_existing_files() {
        let td = tempdir().unwrap();
        let missing = td.path().join("not").join("yet");
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(&missing, "a.jpg"), "a.jpg");
        assert!(!missing.exists());
    }

    #[test]
    fn directories_are_not_treated_as_existing_files() {
        let td = tempdir().unwrap();
        fs::create_dir(td.path().join("a.jpg")).unwrap();
        let mut alloc = FilenameAllocator::new();
        assert_eq!(alloc.allocate(td.path(), "a.jpg"), "a.jpg");
    }

    #[test]
    fn exhausted_suffixes_still_return_a_name() {
        let td = tempdir().unwrap();
        let mut alloc = FilenameAllocator::new();
        let folder = td.path().to_path_buf();
        // Pre-claim every candidate so probing runs out.
        let claimed = alloc.allocated.entry(folder.clone()).or_default();
        claimed.insert("p.jpg".to_string());
        for n in 2..=MAX_DUPLICATE_SUFFIX {
            claimed.insert(format!("p_{n}.jpg"));
        }
        let got = alloc.allocate(&folder, "p.jpg");
        assert_eq!(got, format!("p_{}.jpg", MAX_DUPLICATE_SUFFIX + 1));
    }
}
