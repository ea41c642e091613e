//! In-memory virtual filesystem.
//!
//! The analyzer never touches the disk: an editor (or test) pushes file
//! contents in and the rest of the pipeline reads from here. Contents are
//! shared `Arc<str>` so cached derivations can hold on to the text they
//! were computed from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::paths::normalize_path;

#[derive(Debug, Default, Clone)]
pub struct Vfs {
    files: FxHashMap<PathBuf, Arc<str>>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file. The path is normalized first.
    pub fn set_file(&mut self, path: impl AsRef<Path>, text: impl Into<Arc<str>>) {
        self.files.insert(normalize_path(path.as_ref()), text.into());
    }

    /// Remove a file, returning whether it existed.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> bool {
        self.files.remove(&normalize_path(path.as_ref())).is_some()
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Arc<str>> {
        self.files.get(&normalize_path(path.as_ref())).cloned()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(&normalize_path(path.as_ref()))
    }

    /// All file paths, sorted for deterministic iteration.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read() {
        let mut vfs = Vfs::new();
        vfs.set_file("/ws/a.btl", "func f() {}");
        assert!(vfs.contains("/ws/a.btl"));
        assert_eq!(vfs.read("/ws/a.btl").unwrap().as_ref(), "func f() {}");
        assert!(vfs.read("/ws/missing.btl").is_none());
    }

    #[test]
    fn test_paths_are_normalized() {
        let mut vfs = Vfs::new();
        vfs.set_file("/ws/./sub/../a.btl", "x");
        assert!(vfs.contains("/ws/a.btl"));
    }

    #[test]
    fn test_remove() {
        let mut vfs = Vfs::new();
        vfs.set_file("/ws/a.btl", "x");
        assert!(vfs.remove_file("/ws/a.btl"));
        assert!(!vfs.remove_file("/ws/a.btl"));
    }
}
