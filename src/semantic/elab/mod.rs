//! The elaborator.
//!
//! Turns the CST of a root file (plus everything it includes) into a typed,
//! name-resolved [`Elaboration`]: symbols, scopes, per-node types and
//! resolution breadcrumbs, references, and diagnostics.
//!
//! Phase 0 splices included files' declarations into one unit (cycles cut by
//! a seen set) and registers imports. Phase 1 declares in two sweeps (types
//! and constants first, then functions and globals) and finally elaborates
//! definitions in declaration order. Constant and enum definitions are also
//! forced lazily when an earlier signature needs their value.

mod decls;
mod exprs;
mod stmts;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rowan::TextRange;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::const_eval::{ConstEnv, ConstEvaluator};
use super::db::Db;
use super::diagnostics::{Diagnostic, Severity};
use super::scope::{ScopeId, ScopeTree};
use super::symbol::{ConstValue, QualifiedName, Symbol, SymbolMap, SymbolSource};
use super::ty::{Layout, Type, TypeInterner, coerce, layout_of, unify};
use crate::base::LineIndex;
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxNodePtr};

/// Weak reference to a syntax node of a particular file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub file: PathBuf,
    pub ptr: SyntaxNodePtr,
}

impl NodeKey {
    pub fn new(file: &Path, node: &SyntaxNode) -> Self {
        Self {
            file: file.to_path_buf(),
            ptr: SyntaxNodePtr::new(node),
        }
    }
}

/// One reference to a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefLoc {
    pub file: PathBuf,
    pub range: TextRange,
    pub is_definition: bool,
}

/// Everything the elaborator produces for one root file.
#[derive(Debug, Clone)]
pub struct Elaboration {
    pub module_name: Option<SmolStr>,
    pub root_scope: ScopeId,
    pub scopes: ScopeTree,
    pub symbols: SymbolMap,
    /// Name-introduction and resolution breadcrumbs per node.
    pub node_symbols: FxHashMap<NodeKey, Vec<QualifiedName>>,
    /// Type of every expression, pattern, and type node.
    pub node_types: FxHashMap<NodeKey, Type>,
    pub references: FxHashMap<QualifiedName, Vec<RefLoc>>,
    pub diagnostics: Vec<Diagnostic>,
    /// Resolved import targets, in import order.
    pub imports: Vec<PathBuf>,
    /// Function declarations with a body, for the control-flow pass.
    pub functions: Vec<(PathBuf, SyntaxNodePtr)>,
}

impl Elaboration {
    fn new() -> Self {
        Self {
            module_name: None,
            root_scope: ScopeId(0),
            scopes: ScopeTree::new(),
            symbols: SymbolMap::default(),
            node_symbols: FxHashMap::default(),
            node_types: FxHashMap::default(),
            references: FxHashMap::default(),
            diagnostics: Vec::new(),
            imports: Vec::new(),
            functions: Vec::new(),
        }
    }
}

impl SymbolSource for Elaboration {
    fn symbol(&self, qname: &str) -> Option<&Symbol> {
        self.symbols.get(qname)
    }
}

/// Qualified-name lookup over the unit's own symbols plus its imports.
pub(super) struct LayeredSymbols<'a> {
    pub own: &'a SymbolMap,
    pub imported: &'a [Arc<Elaboration>],
}

impl SymbolSource for LayeredSymbols<'_> {
    fn symbol(&self, qname: &str) -> Option<&Symbol> {
        self.own
            .get(qname)
            .or_else(|| self.imported.iter().find_map(|e| e.symbols.get(qname)))
    }
}

/// Elaborate `root` as a translation unit.
pub(super) fn elaborate(db: &Db<'_>, root: &Path) -> Elaboration {
    let mut elaborator = Elaborator::new(db, root.to_path_buf());
    elaborator.run();
    elaborator.result
}

pub(crate) struct FuncCtx {
    pub qname: QualifiedName,
    pub name: SmolStr,
    pub return_ty: Type,
    pub local_counter: u32,
}

pub(crate) struct Elaborator<'db> {
    pub(crate) db: &'db Db<'db>,
    pub(crate) root_file: PathBuf,
    pub(crate) types: TypeInterner,
    pub(crate) result: Elaboration,
    pub(crate) import_elabs: Vec<Arc<Elaboration>>,
    line_indexes: FxHashMap<PathBuf, Arc<LineIndex>>,
    pub(crate) current_file: PathBuf,
    pub(crate) current_scope: ScopeId,
    pub(crate) func: Option<FuncCtx>,
    pub(crate) anon_enums: u32,
    /// Defining declaration per lazily-defined symbol.
    pub(crate) const_decls: FxHashMap<QualifiedName, (PathBuf, ast::ConstDecl)>,
    pub(crate) enum_decls: FxHashMap<QualifiedName, (PathBuf, ast::EnumDecl)>,
    pub(crate) record_decls: FxHashMap<QualifiedName, (PathBuf, ast::RecordDecl)>,
    /// Symbols whose definition pass already ran.
    pub(crate) processed: FxHashSet<QualifiedName>,
    /// Cycle guard for lazy definition.
    computing: FxHashSet<QualifiedName>,
}

impl<'db> Elaborator<'db> {
    fn new(db: &'db Db<'db>, root_file: PathBuf) -> Self {
        Self {
            db,
            current_file: root_file.clone(),
            root_file,
            types: TypeInterner::new(),
            result: Elaboration::new(),
            import_elabs: Vec::new(),
            line_indexes: FxHashMap::default(),
            current_scope: ScopeId(0),
            func: None,
            anon_enums: 0,
            const_decls: FxHashMap::default(),
            enum_decls: FxHashMap::default(),
            record_decls: FxHashMap::default(),
            processed: FxHashSet::default(),
            computing: FxHashSet::default(),
        }
    }

    fn run(&mut self) {
        let parse = self.db.parse(&self.root_file);
        let root_scope =
            self.result
                .scopes
                .alloc(None, self.root_file.clone(), parse.syntax().text_range());
        self.result.root_scope = root_scope;
        self.current_scope = root_scope;

        // Phase 0: include expansion and import registration.
        let mut seen = FxHashSet::default();
        seen.insert(self.root_file.clone());
        let mut decls: Vec<(PathBuf, ast::Item)> = Vec::new();
        self.expand_file(self.root_file.clone(), &mut seen, &mut decls);

        // Sweep 1a: types and constants.
        for (file, item) in &decls {
            self.current_file = file.clone();
            match item {
                ast::Item::Record(decl) => self.declare_record(decl),
                ast::Item::Enum(decl) => self.declare_enum(decl),
                ast::Item::Const(decl) => self.declare_const(decl),
                _ => {}
            }
        }

        // Sweep 1b: functions and globals (signatures only).
        for (file, item) in &decls {
            self.current_file = file.clone();
            match item {
                ast::Item::Func(decl) => self.declare_func(decl),
                ast::Item::Global(decl) => self.declare_global(decl),
                _ => {}
            }
        }

        // Sweep 2: definitions, in declaration order.
        for (file, item) in &decls {
            self.current_file = file.clone();
            match item {
                ast::Item::Record(decl) => self.define_record_decl(decl),
                ast::Item::Enum(decl) => self.define_enum_decl(decl),
                ast::Item::Const(decl) => self.define_const_decl(decl),
                ast::Item::Func(decl) => self.define_func(decl),
                ast::Item::Global(decl) => self.define_global(decl),
                _ => {}
            }
        }

        self.current_file = self.root_file.clone();
    }

    // =========================================================================
    // Phase 0: expansion
    // =========================================================================

    fn expand_file(
        &mut self,
        file: PathBuf,
        seen: &mut FxHashSet<PathBuf>,
        out: &mut Vec<(PathBuf, ast::Item)>,
    ) {
        let parse = self.db.parse(&file);
        let Some(root) = ast::Root::cast(parse.syntax()) else {
            return;
        };
        for item in root.items() {
            self.current_file = file.clone();
            match item {
                ast::Item::Include(decl) => {
                    let Some(token) = decl.path_token() else {
                        continue;
                    };
                    match crate::project::resolve_include(&file, token.text(), |p| {
                        self.db.file_exists(p)
                    }) {
                        Some(target) => {
                            if seen.insert(target.clone()) {
                                self.expand_file(target, seen, out);
                            }
                        }
                        None => self.error(token.text_range(), "cannot resolve include"),
                    }
                }
                ast::Item::Import(decl) => self.register_import(&decl),
                ast::Item::Module(decl) => {
                    if self.result.module_name.is_none() {
                        self.result.module_name =
                            decl.name_token().map(|t| SmolStr::new(t.text()));
                    }
                }
                other => out.push((file.clone(), other)),
            }
        }
    }

    fn register_import(&mut self, decl: &ast::ImportDecl) {
        let Some(token) = decl.path_token() else {
            return;
        };
        match crate::project::resolve_import(&self.current_file, token.text(), |p| {
            self.db.file_exists(p)
        }) {
            Some(target) => {
                if self.result.imports.contains(&target) {
                    return;
                }
                match self.db.elaborate(&target) {
                    Ok(elab) => {
                        self.result.imports.push(target);
                        self.import_elabs.push(elab);
                    }
                    Err(_) => self.error(token.text_range(), "cyclic import"),
                }
            }
            None => self.error(token.text_range(), "cannot resolve import"),
        }
    }

    // =========================================================================
    // Context helpers
    // =========================================================================

    fn line_index_for(&mut self, file: &PathBuf) -> Arc<LineIndex> {
        if let Some(index) = self.line_indexes.get(file) {
            return index.clone();
        }
        let index = self.db.line_index(file);
        self.line_indexes.insert(file.clone(), index.clone());
        index
    }

    pub(crate) fn diag(
        &mut self,
        severity: Severity,
        range: TextRange,
        message: impl Into<String>,
    ) {
        let file = self.current_file.clone();
        let point_range = self.line_index_for(&file).range(range);
        self.result
            .diagnostics
            .push(Diagnostic::new(severity, file, point_range, message));
    }

    pub(crate) fn error(&mut self, range: TextRange, message: impl Into<String>) {
        self.diag(Severity::Error, range, message);
    }

    pub(crate) fn warning(&mut self, range: TextRange, message: impl Into<String>) {
        self.diag(Severity::Warning, range, message);
    }

    pub(crate) fn push_scope(&mut self, node: &SyntaxNode) -> ScopeId {
        let id = self.result.scopes.alloc(
            Some(self.current_scope),
            self.current_file.clone(),
            node.text_range(),
        );
        std::mem::replace(&mut self.current_scope, id)
    }

    pub(crate) fn pop_scope(&mut self, previous: ScopeId) {
        self.current_scope = previous;
    }

    // =========================================================================
    // Name resolution and recording
    // =========================================================================

    /// Resolve a name through the lexical scopes, then through the root
    /// scopes of imported modules in import order.
    pub(crate) fn resolve_name(&self, name: &str) -> Option<QualifiedName> {
        if let Some(qname) = self.result.scopes.lookup(self.current_scope, name) {
            return Some(qname.clone());
        }
        for elab in &self.import_elabs {
            if let Some(qname) = elab.scopes.get_name(elab.root_scope, name) {
                return Some(qname.clone());
            }
        }
        None
    }

    pub(crate) fn lookup_symbol(&self, qname: &str) -> Option<&Symbol> {
        self.result
            .symbols
            .get(qname)
            .or_else(|| self.import_elabs.iter().find_map(|e| e.symbols.get(qname)))
    }

    pub(crate) fn record_node_symbol(&mut self, node: &SyntaxNode, qname: &QualifiedName) {
        self.result
            .node_symbols
            .entry(NodeKey::new(&self.current_file, node))
            .or_default()
            .push(qname.clone());
    }

    pub(crate) fn record_ref(
        &mut self,
        qname: &QualifiedName,
        range: TextRange,
        is_definition: bool,
    ) {
        self.result
            .references
            .entry(qname.clone())
            .or_default()
            .push(RefLoc {
                file: self.current_file.clone(),
                range,
                is_definition,
            });
    }

    pub(crate) fn set_type(&mut self, node: &SyntaxNode, ty: Type) {
        self.result
            .node_types
            .insert(NodeKey::new(&self.current_file, node), ty);
    }

    pub(crate) fn node_type(&self, node: &SyntaxNode) -> Option<Type> {
        self.result
            .node_types
            .get(&NodeKey::new(&self.current_file, node))
            .cloned()
    }

    // =========================================================================
    // Type operations over the layered symbol view
    // =========================================================================

    pub(crate) fn can_coerce(&self, src: &Type, dst: &Type) -> bool {
        let symbols = LayeredSymbols {
            own: &self.result.symbols,
            imported: &self.import_elabs,
        };
        coerce(src, dst, &symbols)
    }

    pub(crate) fn unify_types(&mut self, a: &Type, b: &Type, strict: bool) -> Option<Type> {
        let Elaborator {
            types,
            result,
            import_elabs,
            ..
        } = self;
        let symbols = LayeredSymbols {
            own: &result.symbols,
            imported: import_elabs,
        };
        unify(a, b, strict, types, &symbols)
    }

    pub(crate) fn layout(&self, ty: &Type) -> Option<Layout> {
        let symbols = LayeredSymbols {
            own: &self.result.symbols,
            imported: &self.import_elabs,
        };
        layout_of(ty, &symbols)
    }

    pub(crate) fn is_sized(&self, ty: &Type) -> bool {
        self.layout(ty).is_some()
    }

    // =========================================================================
    // Constant evaluation
    // =========================================================================

    /// Evaluate a checked expression as a constant.
    ///
    /// Constants and enums the expression mentions are defined on demand
    /// first, so declaration order does not matter for signature-level
    /// constant expressions.
    pub(crate) fn eval_const(&mut self, expr: &ast::Expr) -> Option<ConstValue> {
        let names: Vec<SmolStr> = expr
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::NAME_EXPR)
            .filter_map(|n| ast::NameExpr::cast(n).map(|n| n.name()))
            .collect();
        for name in names {
            if let Some(qname) = self.resolve_name(&name) {
                self.ensure_value_available(&qname);
            }
        }
        let env = ElabConstEnv { elab: self };
        ConstEvaluator::new(&env).eval(expr)
    }

    fn ensure_value_available(&mut self, qname: &QualifiedName) {
        let owner = match self.result.symbols.get(qname) {
            Some(Symbol::Const(c)) => c.owner.clone(),
            _ => return,
        };
        match owner {
            Some(enum_qname) => self.ensure_enum_defined(&enum_qname),
            None => self.ensure_const_defined(qname),
        }
    }

    pub(crate) fn ensure_const_defined(&mut self, qname: &QualifiedName) {
        if self.processed.contains(qname) || !self.computing.insert(qname.clone()) {
            return;
        }
        if let Some((file, decl)) = self.const_decls.get(qname).cloned() {
            self.with_root_context(file, |this| this.define_const(&decl, qname));
        }
        self.computing.remove(qname);
        self.processed.insert(qname.clone());
    }

    pub(crate) fn ensure_enum_defined(&mut self, qname: &QualifiedName) {
        if self.processed.contains(qname) || !self.computing.insert(qname.clone()) {
            return;
        }
        if let Some((file, decl)) = self.enum_decls.get(qname).cloned() {
            self.with_root_context(file, |this| this.define_enum(&decl, qname));
        }
        self.computing.remove(qname);
        self.processed.insert(qname.clone());
    }

    pub(crate) fn ensure_record_defined(&mut self, qname: &QualifiedName) {
        if self.processed.contains(qname) || !self.computing.insert(qname.clone()) {
            return;
        }
        if let Some((file, decl)) = self.record_decls.get(qname).cloned() {
            self.with_root_context(file, |this| this.define_record(&decl, qname));
        }
        self.computing.remove(qname);
        self.processed.insert(qname.clone());
    }

    /// Run `f` with the declaration's own file and the root scope current.
    fn with_root_context(&mut self, file: PathBuf, f: impl FnOnce(&mut Self)) {
        let prev_file = std::mem::replace(&mut self.current_file, file);
        let prev_scope = std::mem::replace(&mut self.current_scope, self.result.root_scope);
        let prev_func = self.func.take();
        f(self);
        self.current_file = prev_file;
        self.current_scope = prev_scope;
        self.func = prev_func;
    }
}

/// Read-only view the constant evaluator resolves through.
struct ElabConstEnv<'a, 'db> {
    elab: &'a Elaborator<'db>,
}

impl ConstEnv for ElabConstEnv<'_, '_> {
    fn constant(&self, name: &str) -> Option<ConstValue> {
        let qname = self.elab.resolve_name(name)?;
        match self.elab.lookup_symbol(&qname)? {
            Symbol::Const(c) => c.value.clone(),
            _ => None,
        }
    }

    fn expr_type(&self, expr: &ast::Expr) -> Option<Type> {
        self.elab.node_type(expr.syntax())
    }

    fn sizeof_type(&self, ty: &ast::TypeNode) -> Option<u64> {
        let resolved = self.elab.node_type(ty.syntax())?;
        self.elab.layout(&resolved).map(|l| l.size)
    }
}
