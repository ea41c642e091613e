//! The workspace import graph.
//!
//! Nodes are workspace file paths; edges are resolved include/import
//! statements. The reverse closure answers "which files would observe a
//! change to this one", which drives cross-file reference queries.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileGraph {
    edges: FxHashMap<PathBuf, Vec<PathBuf>>,
    reverse: FxHashMap<PathBuf, Vec<PathBuf>>,
}

impl FileGraph {
    pub fn new(edges: FxHashMap<PathBuf, Vec<PathBuf>>) -> Self {
        let mut reverse: FxHashMap<PathBuf, Vec<PathBuf>> = FxHashMap::default();
        for (from, targets) in &edges {
            for to in targets {
                reverse.entry(to.clone()).or_default().push(from.clone());
            }
        }
        for dependents in reverse.values_mut() {
            dependents.sort();
            dependents.dedup();
        }
        Self { edges, reverse }
    }

    /// Files that `file` directly includes or imports.
    pub fn imports_of(&self, file: &Path) -> &[PathBuf] {
        self.edges.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that directly include or import `file`.
    pub fn direct_dependents_of(&self, file: &Path) -> &[PathBuf] {
        self.reverse.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that transitively reach `file`, excluding `file` itself.
    pub fn dependents_of(&self, file: &Path) -> Vec<PathBuf> {
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut queue: Vec<PathBuf> = self.direct_dependents_of(file).to_vec();
        while let Some(next) = queue.pop() {
            if next.as_path() == file || !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.direct_dependents_of(&next).iter().cloned());
        }
        let mut out: Vec<_> = seen.into_iter().collect();
        out.sort();
        out
    }

    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.edges.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> FileGraph {
        let mut map = FxHashMap::default();
        for (from, tos) in edges {
            map.insert(
                PathBuf::from(from),
                tos.iter().map(PathBuf::from).collect(),
            );
        }
        FileGraph::new(map)
    }

    #[test]
    fn test_transitive_dependents() {
        let g = graph(&[
            ("/a", &["/b"]),
            ("/b", &["/c"]),
            ("/c", &[]),
            ("/d", &["/c"]),
        ]);
        assert_eq!(
            g.dependents_of(Path::new("/c")),
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/d")]
        );
        assert!(g.dependents_of(Path::new("/a")).is_empty());
    }

    #[test]
    fn test_cyclic_dependents_terminate() {
        let g = graph(&[("/a", &["/b"]), ("/b", &["/a"])]);
        assert_eq!(g.dependents_of(Path::new("/a")), vec![PathBuf::from("/b")]);
    }
}
