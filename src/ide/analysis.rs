//! AnalysisHost — unified state management for editor queries.
//!
//! The `AnalysisHost` owns the virtual filesystem and the reactive cache.
//! File changes are applied through it, which deletes the file's cache keys
//! so every derived value recomputes lazily on the next query.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.set_file_content("/ws/main.btl", "func main(): Int32 { return 0; }");
//! let diagnostics = host.diagnostics("/ws/main.btl");
//! ```

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{Point, Range};
use crate::core::ReactiveCache;
use crate::parser::SyntaxNode;
use crate::project::{Vfs, normalize_path};
use crate::semantic::db::{Db, vfs_key};
use crate::semantic::{Diagnostic, NodeKey, QualifiedName, Severity, Symbol, Type};

/// A symbol visible at some position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedSymbol {
    pub name: SmolStr,
    pub qualified_name: QualifiedName,
    pub kind: &'static str,
}

/// One reference to a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub file: PathBuf,
    pub range: Range,
    pub is_definition: bool,
}

/// A symbol declared in a file, for outline views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: SmolStr,
    pub qualified_name: QualifiedName,
    pub kind: &'static str,
    pub range: Range,
}

/// Owns all mutable state of the analyzer.
///
/// Apply changes via `set_file_content()` and `remove_file()`, then query.
pub struct AnalysisHost {
    vfs: Vfs,
    cache: ReactiveCache,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self {
            vfs: Vfs::new(),
            cache: ReactiveCache::new(),
        }
    }

    fn db(&self) -> Db<'_> {
        Db::new(&self.vfs, &self.cache)
    }

    /// Set the content of a file, invalidating everything derived from it.
    pub fn set_file_content(&mut self, path: impl AsRef<Path>, text: &str) {
        let path = normalize_path(path.as_ref());
        let added = !self.vfs.contains(&path);
        self.vfs.set_file(&path, text);
        self.cache.delete(&vfs_key(&path));
        if added {
            self.cache.delete("files");
        }
    }

    /// Remove a file, invalidating everything derived from it.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        let path = normalize_path(path.as_ref());
        if self.vfs.remove_file(&path) {
            self.cache.delete(&vfs_key(&path));
            self.cache.delete("files");
        }
    }

    /// The syntax tree of a file (for locating nodes to query with).
    pub fn syntax(&self, path: impl AsRef<Path>) -> SyntaxNode {
        let path = normalize_path(path.as_ref());
        self.db().parse(&path).syntax()
    }

    /// All diagnostics of the unit rooted at `path`: lexical and syntactic
    /// errors, elaboration diagnostics, and control-flow diagnostics.
    pub fn diagnostics(&self, path: impl AsRef<Path>) -> Vec<Diagnostic> {
        let path = normalize_path(path.as_ref());
        let db = self.db();
        let mut out = Vec::new();

        let line_index = db.line_index(&path);
        for error in &db.parse(&path).errors {
            out.push(Diagnostic::error(
                path.clone(),
                line_index.range(error.range),
                error.message.clone(),
            ));
        }
        match db.elaborate(&path) {
            Ok(elab) => out.extend(elab.diagnostics.iter().cloned()),
            Err(cycle) => out.push(Diagnostic::new(
                Severity::Error,
                path.clone(),
                Range::default(),
                cycle.to_string(),
            )),
        }
        out.extend(db.flow_diagnostics(&path).iter().cloned());
        out
    }

    /// Symbols visible at a position: the scope chain from the innermost
    /// scope outward, plus the root scopes of imported modules.
    pub fn symbols_in_scope(&self, path: impl AsRef<Path>, point: Point) -> Vec<ScopedSymbol> {
        let path = normalize_path(path.as_ref());
        let db = self.db();
        let Ok(elab) = db.elaborate(&path) else {
            return Vec::new();
        };
        let Some(offset) = db.line_index(&path).offset(point) else {
            return Vec::new();
        };
        let scope = elab
            .scopes
            .find_scope_at(&path, offset)
            .unwrap_or(elab.root_scope);

        let mut names = elab.scopes.visible_names(scope);
        for import in &elab.imports {
            if let Ok(imported) = db.elaborate(import) {
                for (name, qname) in &imported.scopes.get(imported.root_scope).names {
                    names
                        .entry(name.clone())
                        .or_insert_with(|| qname.clone());
                }
            }
        }

        let mut out: Vec<ScopedSymbol> = names
            .into_iter()
            .map(|(name, qualified_name)| {
                let kind = self
                    .symbol(&path, &qualified_name)
                    .map(|s| s.kind_name())
                    .unwrap_or("symbol");
                ScopedSymbol {
                    name,
                    qualified_name,
                    kind,
                }
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Qualified names a node resolves to (or introduces). Field selectors
    /// filter to record fields.
    pub fn resolve_symbol(&self, path: impl AsRef<Path>, node: &SyntaxNode) -> Vec<QualifiedName> {
        let path = normalize_path(path.as_ref());
        let Ok(elab) = self.db().elaborate(&path) else {
            return Vec::new();
        };
        let key = NodeKey::new(&path, node);
        let mut qnames = elab
            .node_symbols
            .get(&key)
            .cloned()
            .unwrap_or_default();
        if node.kind() == crate::parser::SyntaxKind::FIELD_EXPR {
            qnames.retain(|q| {
                matches!(self.symbol(&path, q), Some(Symbol::RecordField(_)))
            });
        }
        qnames
    }

    /// Type of an expression node.
    pub fn infer_type(&self, path: impl AsRef<Path>, node: &SyntaxNode) -> Option<Type> {
        self.node_type(path, node)
    }

    /// Type a type node evaluates to.
    pub fn eval_type(&self, path: impl AsRef<Path>, node: &SyntaxNode) -> Option<Type> {
        self.node_type(path, node)
    }

    fn node_type(&self, path: impl AsRef<Path>, node: &SyntaxNode) -> Option<Type> {
        let path = normalize_path(path.as_ref());
        let elab = self.db().elaborate(&path).ok()?;
        elab.node_types.get(&NodeKey::new(&path, node)).cloned()
    }

    /// Every reference to `qualified_name` across the unit rooted at `path`
    /// and every unit that transitively reaches it.
    pub fn references(&self, path: impl AsRef<Path>, qualified_name: &str) -> Vec<Reference> {
        let path = normalize_path(path.as_ref());
        let db = self.db();
        let mut roots = vec![path.clone()];
        roots.extend(db.file_graph().dependents_of(&path));

        let mut seen: FxHashSet<(PathBuf, Range, bool)> = FxHashSet::default();
        let mut out = Vec::new();
        for root in roots {
            let Ok(elab) = db.elaborate(&root) else {
                continue;
            };
            let Some(refs) = elab.references.get(qualified_name) else {
                continue;
            };
            for reference in refs {
                let range = db.line_index(&reference.file).range(reference.range);
                let entry = (reference.file.clone(), range, reference.is_definition);
                if seen.insert(entry) {
                    out.push(Reference {
                        file: reference.file.clone(),
                        range,
                        is_definition: reference.is_definition,
                    });
                }
            }
        }
        out.sort_by(|a, b| (&a.file, a.range.start).cmp(&(&b.file, b.range.start)));
        out
    }

    /// Flat outline of the symbols declared in `path`.
    pub fn document_symbols(&self, path: impl AsRef<Path>) -> Vec<DocumentSymbol> {
        let path = normalize_path(path.as_ref());
        let db = self.db();
        let Ok(elab) = db.elaborate(&path) else {
            return Vec::new();
        };
        let line_index = db.line_index(&path);
        let mut out = Vec::new();
        for symbol in elab.symbols.values() {
            if matches!(symbol, Symbol::Local(_) | Symbol::FuncParam(_)) {
                continue;
            }
            let Some(origin) = symbol.origins().iter().find(|o| o.file == path) else {
                continue;
            };
            let range = origin
                .name_range
                .unwrap_or_else(|| origin.node.text_range());
            out.push(DocumentSymbol {
                name: symbol.name().clone(),
                qualified_name: symbol.qualified_name().clone(),
                kind: symbol.kind_name(),
                range: line_index.range(range),
            });
        }
        out.sort_by(|a, b| (a.range.start, &a.qualified_name).cmp(&(b.range.start, &b.qualified_name)));
        out
    }

    /// Look up a symbol of the unit rooted at `path` by qualified name,
    /// checking imported units as well.
    pub fn symbol(&self, path: impl AsRef<Path>, qualified_name: &str) -> Option<Symbol> {
        let path = normalize_path(path.as_ref());
        let db = self.db();
        let elab = db.elaborate(&path).ok()?;
        if let Some(symbol) = elab.symbols.get(qualified_name) {
            return Some(symbol.clone());
        }
        for import in &elab.imports {
            if let Ok(imported) = db.elaborate(import) {
                if let Some(symbol) = imported.symbols.get(qualified_name) {
                    return Some(symbol.clone());
                }
            }
        }
        None
    }

    /// Find the innermost node of a kind at a position, for tests and
    /// editor glue that start from a cursor.
    pub fn node_at(
        &self,
        path: impl AsRef<Path>,
        point: Point,
        kind: crate::parser::SyntaxKind,
    ) -> Option<SyntaxNode> {
        let path = normalize_path(path.as_ref());
        let db = self.db();
        let offset = db.line_index(&path).offset(point)?;
        let root = db.parse(&path).syntax();
        let mut best: Option<SyntaxNode> = None;
        for node in root.descendants() {
            if node.kind() == kind && node.text_range().contains_inclusive(offset) {
                match &best {
                    Some(b) if b.text_range().len() <= node.text_range().len() => {}
                    _ => best = Some(node),
                }
            }
        }
        best
    }
}
