//! Lexical scopes.
//!
//! Scopes form a tree keyed by the defining syntax node's file and range.
//! Each scope maps simple names to qualified names; lookups walk toward the
//! root. The root scope of a unit is exposed for import-based lookup.

use std::path::{Path, PathBuf};

use rowan::{TextRange, TextSize};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::symbol::QualifiedName;

/// Index into the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Maps simple name to the qualified name bound in this scope.
    pub names: FxHashMap<SmolStr, QualifiedName>,
    /// File and range of the defining syntax node.
    pub file: PathBuf,
    pub range: TextRange,
}

/// Arena of scopes for one elaboration.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, parent: Option<ScopeId>, file: PathBuf, range: TextRange) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            children: Vec::new(),
            names: FxHashMap::default(),
            file,
            range,
        });
        if let Some(parent) = parent {
            self.scopes[parent.index()].children.push(id);
        }
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Bind a name in `scope`, returning the previous binding if any.
    pub fn add(
        &mut self,
        scope: ScopeId,
        name: SmolStr,
        qname: QualifiedName,
    ) -> Option<QualifiedName> {
        self.scopes[scope.index()].names.insert(name, qname)
    }

    /// Look up a name in this scope only.
    pub fn get_name(&self, scope: ScopeId, name: &str) -> Option<&QualifiedName> {
        self.scopes[scope.index()].names.get(name)
    }

    /// Look up a name, walking up to the root scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&QualifiedName> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(qname) = scope.names.get(name) {
                return Some(qname);
            }
            current = scope.parent;
        }
        None
    }

    /// Innermost scope of `file` whose defining node contains `offset`.
    pub fn find_scope_at(&self, file: &Path, offset: TextSize) -> Option<ScopeId> {
        let mut best: Option<ScopeId> = None;
        for (i, scope) in self.scopes.iter().enumerate() {
            if scope.file != file || !scope.range.contains_inclusive(offset) {
                continue;
            }
            match best {
                Some(b) if self.scopes[b.index()].range.len() <= scope.range.len() => {}
                _ => best = Some(ScopeId(i as u32)),
            }
        }
        best
    }

    /// All bindings visible from `scope`, nearest binding per name.
    pub fn visible_names(&self, scope: ScopeId) -> FxHashMap<SmolStr, QualifiedName> {
        let mut out: FxHashMap<SmolStr, QualifiedName> = FxHashMap::default();
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            for (name, qname) in &scope.names {
                out.entry(name.clone()).or_insert_with(|| qname.clone());
            }
            current = scope.parent;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
