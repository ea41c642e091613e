//! The symbol model.
//!
//! Represents every named element of a translation unit. Symbols are keyed
//! by qualified name, a deterministic string scheme per kind, so the same
//! declaration seen through different files resolves to the same entry. A
//! symbol accumulates one `Origin` per declaration site; the definition
//! flips `is_defined` exactly once.

use std::path::PathBuf;

use indexmap::IndexMap;
use num_bigint::BigInt;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

use super::ty::Type;
use crate::parser::SyntaxNodePtr;

/// Stable string key identifying a symbol across a workspace.
pub type QualifiedName = SmolStr;

/// Symbols of one translation unit, in insertion (declaration) order.
pub type SymbolMap = IndexMap<QualifiedName, Symbol, FxBuildHasher>;

/// Qualified-name lookup, possibly layered over imported units.
pub trait SymbolSource {
    fn symbol(&self, qname: &str) -> Option<&Symbol>;
}

impl SymbolSource for SymbolMap {
    fn symbol(&self, qname: &str) -> Option<&Symbol> {
        self.get(qname)
    }
}

/// Where a symbol was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub file: PathBuf,
    /// The declaring node.
    pub node: SyntaxNodePtr,
    /// The name token's node range, when the declaration has a name.
    pub name_range: Option<rowan::TextRange>,
    /// True for declarations without a body/definition.
    pub is_forward_decl: bool,
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Bool(bool),
    /// Arbitrary precision: source integers are 64-bit and intermediate
    /// arithmetic may overflow the host word.
    Int(BigInt, Type),
    Null(Type),
    Str(Vec<u8>),
}

/// One field of a record, in declaration order (inherited fields first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSig {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub ty: Type,
    pub default: Option<ConstValue>,
    /// Inherited from the base record.
    pub from_base: bool,
}

/// One parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSig {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub ty: Type,
    pub has_default: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub is_union: bool,
    pub base: Option<QualifiedName>,
    pub fields: Vec<FieldSig>,
    pub origins: Vec<Origin>,
    pub is_defined: bool,
}

impl RecordSymbol {
    pub fn field(&self, name: &str) -> Option<&FieldSig> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub owner: QualifiedName,
    pub ty: Type,
    pub origins: Vec<Origin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub members: Vec<QualifiedName>,
    pub origins: Vec<Origin>,
    pub is_defined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub params: Vec<ParamSig>,
    pub return_ty: Type,
    pub is_variadic: bool,
    pub is_extern: bool,
    pub origins: Vec<Origin>,
    pub is_defined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub ty: Type,
    pub index: u32,
    pub origins: Vec<Origin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub ty: Type,
    pub is_extern: bool,
    pub origins: Vec<Origin>,
    pub is_defined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub ty: Type,
    pub value: Option<ConstValue>,
    /// The enum this constant is a member of, if any.
    pub owner: Option<QualifiedName>,
    pub origins: Vec<Origin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSymbol {
    pub name: SmolStr,
    pub qname: QualifiedName,
    pub ty: Type,
    pub origins: Vec<Origin>,
}

/// Represents a named element of a Bittle translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Record(RecordSymbol),
    RecordField(FieldSymbol),
    Enum(EnumSymbol),
    Func(FuncSymbol),
    FuncParam(ParamSymbol),
    Global(GlobalSymbol),
    Const(ConstSymbol),
    Local(LocalSymbol),
}

impl Symbol {
    /// Returns the simple name of this symbol
    pub fn name(&self) -> &SmolStr {
        match self {
            Symbol::Record(s) => &s.name,
            Symbol::RecordField(s) => &s.name,
            Symbol::Enum(s) => &s.name,
            Symbol::Func(s) => &s.name,
            Symbol::FuncParam(s) => &s.name,
            Symbol::Global(s) => &s.name,
            Symbol::Const(s) => &s.name,
            Symbol::Local(s) => &s.name,
        }
    }

    /// Returns the qualified name of this symbol
    pub fn qualified_name(&self) -> &QualifiedName {
        match self {
            Symbol::Record(s) => &s.qname,
            Symbol::RecordField(s) => &s.qname,
            Symbol::Enum(s) => &s.qname,
            Symbol::Func(s) => &s.qname,
            Symbol::FuncParam(s) => &s.qname,
            Symbol::Global(s) => &s.qname,
            Symbol::Const(s) => &s.qname,
            Symbol::Local(s) => &s.qname,
        }
    }

    /// Human-readable kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Symbol::Record(s) if s.is_union => "union",
            Symbol::Record(_) => "struct",
            Symbol::RecordField(_) => "field",
            Symbol::Enum(_) => "enum",
            Symbol::Func(_) => "function",
            Symbol::FuncParam(_) => "parameter",
            Symbol::Global(_) => "global",
            Symbol::Const(_) => "constant",
            Symbol::Local(_) => "variable",
        }
    }

    pub fn origins(&self) -> &[Origin] {
        match self {
            Symbol::Record(s) => &s.origins,
            Symbol::RecordField(s) => &s.origins,
            Symbol::Enum(s) => &s.origins,
            Symbol::Func(s) => &s.origins,
            Symbol::FuncParam(s) => &s.origins,
            Symbol::Global(s) => &s.origins,
            Symbol::Const(s) => &s.origins,
            Symbol::Local(s) => &s.origins,
        }
    }

    pub fn origins_mut(&mut self) -> &mut Vec<Origin> {
        match self {
            Symbol::Record(s) => &mut s.origins,
            Symbol::RecordField(s) => &mut s.origins,
            Symbol::Enum(s) => &mut s.origins,
            Symbol::Func(s) => &mut s.origins,
            Symbol::FuncParam(s) => &mut s.origins,
            Symbol::Global(s) => &mut s.origins,
            Symbol::Const(s) => &mut s.origins,
            Symbol::Local(s) => &mut s.origins,
        }
    }

    /// Whether a definition origin has been attached.
    ///
    /// Symbols without a forward-declaration form count as defined from
    /// their single declaration.
    pub fn is_defined(&self) -> bool {
        match self {
            Symbol::Record(s) => s.is_defined,
            Symbol::Enum(s) => s.is_defined,
            Symbol::Func(s) => s.is_defined,
            Symbol::Global(s) => s.is_defined,
            Symbol::RecordField(_)
            | Symbol::FuncParam(_)
            | Symbol::Const(_)
            | Symbol::Local(_) => true,
        }
    }

    /// The type of this symbol when used as a value.
    pub fn value_type(&self) -> Option<&Type> {
        match self {
            Symbol::RecordField(s) => Some(&s.ty),
            Symbol::FuncParam(s) => Some(&s.ty),
            Symbol::Global(s) => Some(&s.ty),
            Symbol::Const(s) => Some(&s.ty),
            Symbol::Local(s) => Some(&s.ty),
            Symbol::Record(_) | Symbol::Enum(_) | Symbol::Func(_) => None,
        }
    }

    /// Whether this symbol names a type.
    pub fn is_type(&self) -> bool {
        matches!(self, Symbol::Record(_) | Symbol::Enum(_))
    }
}

// =============================================================================
// Qualified-name schemes
// =============================================================================

pub fn record_qname(name: &str) -> QualifiedName {
    SmolStr::new(format!("record:{name}"))
}

pub fn enum_qname(name: &str) -> QualifiedName {
    SmolStr::new(format!("enum:{name}"))
}

pub fn func_qname(name: &str) -> QualifiedName {
    SmolStr::new(format!("func:{name}"))
}

pub fn global_qname(name: &str) -> QualifiedName {
    SmolStr::new(format!("global:{name}"))
}

pub fn const_qname(name: &str) -> QualifiedName {
    SmolStr::new(format!("const:{name}"))
}

pub fn field_qname(record: &str, field: &str) -> QualifiedName {
    SmolStr::new(format!("{record}.{field}"))
}

pub fn param_qname(func_qname: &str, index: u32) -> QualifiedName {
    SmolStr::new(format!("{func_qname}.param:{index}"))
}

pub fn local_qname(func_name: &str, counter: u32) -> QualifiedName {
    SmolStr::new(format!("{func_name}.local:{counter}"))
}
