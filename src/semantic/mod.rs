//! Semantic analysis: the type model, symbols and scopes, constant
//! evaluation, the elaborator, and the control-flow analyzer, stitched
//! together behind the cached [`Db`](db::Db) query layer.

pub mod const_eval;
pub mod db;
mod diagnostics;
pub mod elab;
pub mod flow;
mod scope;
mod symbol;
pub mod ty;

pub use diagnostics::{Diagnostic, Severity};
pub use elab::{Elaboration, NodeKey, RefLoc};
pub use scope::{Scope, ScopeId, ScopeTree};
pub use symbol::{
    ConstSymbol, ConstValue, EnumSymbol, FieldSig, FieldSymbol, FuncSymbol, GlobalSymbol,
    LocalSymbol, Origin, ParamSig, ParamSymbol, QualifiedName, RecordSymbol, Symbol, SymbolMap,
    SymbolSource,
};
pub use ty::{Layout, Type, TypeInterner, TypeKind, castable, coerce, layout_of, unify};
