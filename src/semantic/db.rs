//! The cached query layer.
//!
//! Bundles the virtual filesystem with the reactive cache and exposes every
//! derivation as a keyed computation: file text, parse tree, line index,
//! elaboration, control-flow diagnostics, resolved imports, and the file
//! graph. Whoever computes through a `Db` automatically records dependency
//! edges, so a file-change event only needs to delete the file's own keys.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::diagnostics::Diagnostic;
use super::elab::{self, Elaboration};
use super::flow;
use crate::base::LineIndex;
use crate::core::{CycleError, ReactiveCache};
use crate::parser::ast::{self, AstNode};
use crate::parser::{Parse, parse};
use crate::project::{FileGraph, Vfs, resolve_import, resolve_include};

/// Handle over the shared state; create one per query batch.
#[derive(Clone, Copy)]
pub struct Db<'a> {
    pub vfs: &'a Vfs,
    pub cache: &'a ReactiveCache,
}

pub(crate) fn vfs_key(path: &Path) -> String {
    format!("vfs:{}", path.display())
}

fn key(prefix: &str, path: &Path) -> String {
    format!("{prefix}:{}", path.display())
}

impl<'a> Db<'a> {
    pub fn new(vfs: &'a Vfs, cache: &'a ReactiveCache) -> Self {
        Self { vfs, cache }
    }

    /// Current contents of a file, or `None` when it does not exist.
    pub fn file_text(&self, path: &Path) -> Option<Arc<str>> {
        self.cache
            .compute(&vfs_key(path), || self.vfs.read(path))
            .expect("file reads have no dependencies")
    }

    pub fn file_exists(&self, path: &Path) -> bool {
        self.file_text(path).is_some()
    }

    /// Lossless parse of a file; a missing file parses as empty text.
    pub fn parse(&self, path: &Path) -> Arc<Parse> {
        self.cache
            .compute(&key("parse", path), || {
                let text = self.file_text(path).unwrap_or_else(|| Arc::from(""));
                tracing::debug!(file = %path.display(), "parse");
                Arc::new(parse(&text))
            })
            .expect("parsing depends only on file text")
    }

    pub fn line_index(&self, path: &Path) -> Arc<LineIndex> {
        self.cache
            .compute(&key("line-index", path), || {
                let text = self.file_text(path).unwrap_or_else(|| Arc::from(""));
                Arc::new(LineIndex::new(&text))
            })
            .expect("line indexing depends only on file text")
    }

    /// Elaborate `path` as the root of a translation unit.
    ///
    /// Fails only when re-entered for a unit that is already being
    /// elaborated further up the stack (an import cycle).
    pub fn elaborate(&self, path: &Path) -> Result<Arc<Elaboration>, CycleError> {
        self.cache.compute(&key("elab", path), || {
            tracing::debug!(file = %path.display(), "elaborate");
            Arc::new(elab::elaborate(self, path))
        })
    }

    /// Control-flow diagnostics for the unit rooted at `path`.
    pub fn flow_diagnostics(&self, path: &Path) -> Arc<Vec<Diagnostic>> {
        self.cache
            .compute(&key("flow", path), || match self.elaborate(path) {
                Ok(elab) => Arc::new(flow::analyze(self, &elab)),
                Err(_) => Arc::new(Vec::new()),
            })
            .expect("flow analysis is never re-entered")
    }

    /// Include/import targets of one file, resolved against the VFS.
    pub fn resolved_imports(&self, path: &Path) -> Arc<Vec<PathBuf>> {
        self.cache
            .compute(&key("imports", path), || {
                let parse = self.parse(path);
                let mut targets = Vec::new();
                if let Some(root) = ast::Root::cast(parse.syntax()) {
                    for item in root.items() {
                        let resolved = match &item {
                            ast::Item::Include(decl) => decl.path_token().and_then(|tok| {
                                resolve_include(path, tok.text(), |p| self.file_exists(p))
                            }),
                            ast::Item::Import(decl) => decl.path_token().and_then(|tok| {
                                resolve_import(path, tok.text(), |p| self.file_exists(p))
                            }),
                            _ => None,
                        };
                        if let Some(target) = resolved {
                            targets.push(target);
                        }
                    }
                }
                targets.sort();
                targets.dedup();
                Arc::new(targets)
            })
            .expect("import resolution depends only on parses and file text")
    }

    /// All files currently in the workspace.
    pub fn files(&self) -> Arc<Vec<PathBuf>> {
        self.cache
            .compute("files", || Arc::new(self.vfs.paths()))
            .expect("the file list has no dependencies")
    }

    /// The workspace import graph.
    pub fn file_graph(&self) -> Arc<FileGraph> {
        self.cache
            .compute("file-graph", || {
                let mut edges = FxHashMap::default();
                for file in self.files().iter() {
                    edges.insert(file.clone(), self.resolved_imports(file).as_ref().clone());
                }
                tracing::debug!(files = edges.len(), "file graph rebuilt");
                Arc::new(FileGraph::new(edges))
            })
            .expect("the file graph is never re-entered")
    }
}
