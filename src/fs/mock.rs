// src/fs/mock.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::FileSystem;

#[derive(Debug, Default)]
struct Entries {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

/// In-memory filesystem made of registered files and directories.
///
/// Adding a file implicitly registers all of its ancestors as directories.
/// Clones share the same entries, so a test can keep a handle and delete
/// files after handing the mock to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<Entries>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.files.insert(path.to_path_buf());
        add_ancestors(&mut entries, path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.dirs.insert(path.to_path_buf());
        add_ancestors(&mut entries, path);
    }

    /// Forget a file or directory (ancestors are kept).
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.files.remove(path);
        entries.dirs.remove(path);
    }
}

fn add_ancestors(entries: &mut Entries, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        entries.dirs.insert(ancestor.to_path_buf());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.dirs.contains(path)
    }
}
