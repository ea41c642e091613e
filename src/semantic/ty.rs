//! The type model: representation, interning, layout, unification, coercion.
//!
//! Types are immutable `Rc` values with structural equality. Pointer, array,
//! enum, and record types are interned per elaboration so canonical equality
//! and structural equality coincide; the tables die with the elaboration
//! result that owns them.

use std::fmt;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::symbol::{QualifiedName, Symbol, SymbolSource};

pub type Type = Rc<TypeKind>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    /// Signed integer; `bits` is one of 8/16/32/64, or `None` while the
    /// width is still unconstrained.
    Int { bits: Option<u8> },
    Ptr { pointee: Type, is_mut: bool },
    Arr { elem: Type, size: Option<u64> },
    Enum { sym: QualifiedName },
    Record { sym: QualifiedName },
    Never,
    /// The handle a variadic callee receives for its `...` tail.
    RestParam,
    /// The type of anything that already failed to check.
    Err,
}

impl TypeKind {
    pub fn is_int(&self) -> bool {
        matches!(self, TypeKind::Int { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeKind::Err)
    }

    /// Scalars: the types a constant or a comparison operand may have.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeKind::Bool | TypeKind::Int { .. } | TypeKind::Ptr { .. } | TypeKind::Enum { .. }
        )
    }
}

/// Strip the qualified-name scheme prefix for display.
fn display_name(qname: &QualifiedName) -> &str {
    qname.split_once(':').map(|(_, n)| n).unwrap_or(qname)
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Void => write!(f, "Void"),
            TypeKind::Bool => write!(f, "Bool"),
            TypeKind::Int { bits: Some(b) } => write!(f, "Int{}", b),
            TypeKind::Int { bits: None } => write!(f, "Int"),
            TypeKind::Ptr { pointee, is_mut } => {
                if *is_mut {
                    write!(f, "*mut {}", pointee)
                } else {
                    write!(f, "*{}", pointee)
                }
            }
            TypeKind::Arr { elem, size: Some(n) } => write!(f, "[{}; {}]", elem, n),
            TypeKind::Arr { elem, size: None } => write!(f, "[{}]", elem),
            TypeKind::Enum { sym } | TypeKind::Record { sym } => {
                write!(f, "{}", display_name(sym))
            }
            TypeKind::Never => write!(f, "!"),
            TypeKind::RestParam => write!(f, "..."),
            TypeKind::Err => write!(f, "{{error}}"),
        }
    }
}

/// Per-elaboration interning tables.
///
/// Only composite types get table entries; the scalar singletons are
/// preallocated so they are always pointer-identical too.
pub struct TypeInterner {
    table: FxHashMap<TypeKind, Type>,
    void: Type,
    bool_: Type,
    never: Type,
    err: Type,
    rest: Type,
    int_unknown: Type,
    int8: Type,
    int16: Type,
    int32: Type,
    int64: Type,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        Self {
            table: FxHashMap::default(),
            void: Rc::new(TypeKind::Void),
            bool_: Rc::new(TypeKind::Bool),
            never: Rc::new(TypeKind::Never),
            err: Rc::new(TypeKind::Err),
            rest: Rc::new(TypeKind::RestParam),
            int_unknown: Rc::new(TypeKind::Int { bits: None }),
            int8: Rc::new(TypeKind::Int { bits: Some(8) }),
            int16: Rc::new(TypeKind::Int { bits: Some(16) }),
            int32: Rc::new(TypeKind::Int { bits: Some(32) }),
            int64: Rc::new(TypeKind::Int { bits: Some(64) }),
        }
    }

    pub fn void(&self) -> Type {
        self.void.clone()
    }

    pub fn bool_(&self) -> Type {
        self.bool_.clone()
    }

    pub fn never(&self) -> Type {
        self.never.clone()
    }

    pub fn err(&self) -> Type {
        self.err.clone()
    }

    pub fn rest_param(&self) -> Type {
        self.rest.clone()
    }

    pub fn int(&self, bits: Option<u8>) -> Type {
        match bits {
            None => self.int_unknown.clone(),
            Some(8) => self.int8.clone(),
            Some(16) => self.int16.clone(),
            Some(32) => self.int32.clone(),
            Some(64) => self.int64.clone(),
            Some(b) => unreachable!("invalid int width: {b}"),
        }
    }

    fn intern(&mut self, kind: TypeKind) -> Type {
        self.table
            .entry(kind)
            .or_insert_with_key(|k| Rc::new(k.clone()))
            .clone()
    }

    pub fn ptr(&mut self, pointee: Type, is_mut: bool) -> Type {
        self.intern(TypeKind::Ptr { pointee, is_mut })
    }

    pub fn array(&mut self, elem: Type, size: Option<u64>) -> Type {
        self.intern(TypeKind::Arr { elem, size })
    }

    pub fn enum_type(&mut self, sym: QualifiedName) -> Type {
        self.intern(TypeKind::Enum { sym })
    }

    pub fn record(&mut self, sym: QualifiedName) -> Type {
        self.intern(TypeKind::Record { sym })
    }

    /// Resolve a builtin type name. `Int` is the 64-bit integer and `Char`
    /// the 8-bit one.
    pub fn builtin(&self, name: &str) -> Option<Type> {
        Some(match name {
            "Void" => self.void(),
            "Bool" => self.bool_(),
            "Char" | "Int8" => self.int(Some(8)),
            "Int16" => self.int(Some(16)),
            "Int32" => self.int(Some(32)),
            "Int" | "Int64" => self.int(Some(64)),
            _ => return None,
        })
    }
}

/// Size and alignment in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

fn align_to(offset: u64, align: u64) -> u64 {
    offset.div_ceil(align.max(1)) * align.max(1)
}

/// Compute the layout of a type, or `None` when it is unsized: Void, Never,
/// the error type, incomplete records, and arrays without a length.
pub fn layout_of(ty: &Type, symbols: &dyn SymbolSource) -> Option<Layout> {
    let mut visiting = FxHashSet::default();
    layout_impl(ty, symbols, &mut visiting)
}

fn layout_impl(
    ty: &Type,
    symbols: &dyn SymbolSource,
    visiting: &mut FxHashSet<QualifiedName>,
) -> Option<Layout> {
    match &**ty {
        TypeKind::Void | TypeKind::Never | TypeKind::Err => None,
        TypeKind::Bool => Some(Layout { size: 1, align: 1 }),
        TypeKind::Int { bits } => {
            let bytes = u64::from(bits.unwrap_or(64)) / 8;
            Some(Layout {
                size: bytes,
                align: bytes,
            })
        }
        TypeKind::Ptr { .. } | TypeKind::RestParam => Some(Layout { size: 8, align: 8 }),
        TypeKind::Arr { elem, size } => {
            let elem_layout = layout_impl(elem, symbols, visiting)?;
            let n = (*size)?;
            Some(Layout {
                size: elem_layout.size.checked_mul(n)?,
                align: elem_layout.align,
            })
        }
        // Enums delegate to their underlying 32-bit integer.
        TypeKind::Enum { .. } => Some(Layout { size: 4, align: 4 }),
        TypeKind::Record { sym } => {
            if !visiting.insert(sym.clone()) {
                return None;
            }
            let record = match symbols.symbol(sym) {
                Some(Symbol::Record(r)) if r.is_defined => r,
                _ => return None,
            };
            let mut size = 0u64;
            let mut align = 1u64;
            if record.is_union {
                for field in &record.fields {
                    let l = layout_impl(&field.ty, symbols, visiting)?;
                    size = size.max(l.size);
                    align = align.max(l.align);
                }
            } else {
                for field in &record.fields {
                    let l = layout_impl(&field.ty, symbols, visiting)?;
                    size = align_to(size, l.align) + l.size;
                    align = align.max(l.align);
                }
            }
            visiting.remove(sym);
            Some(Layout {
                size: align_to(size, align),
                align,
            })
        }
    }
}

/// Whether `src` is a record deriving (transitively) from `base`.
fn derives_from(src: &QualifiedName, base: &QualifiedName, symbols: &dyn SymbolSource) -> bool {
    let mut current = src.clone();
    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
    while seen.insert(current.clone()) {
        let Some(Symbol::Record(record)) = symbols.symbol(&current) else {
            return false;
        };
        match &record.base {
            Some(b) if b == base => return true,
            Some(b) => current = b.clone(),
            None => return false,
        }
    }
    false
}

/// Whether `src` implicitly coerces to `dst`.
///
/// Allowed: identity; numeric widening; enum to a wide-enough int; pointer
/// to a base-record pointer (dropping `mut` is fine, adding it is not);
/// coercion into a union that has a field of the source type; `Never` and
/// the error type convert to anything.
pub fn coerce(src: &Type, dst: &Type, symbols: &dyn SymbolSource) -> bool {
    if src == dst {
        return true;
    }
    match (&**src, &**dst) {
        (TypeKind::Err | TypeKind::Never, _) => true,
        (_, TypeKind::Err) => true,
        (TypeKind::Int { bits: a }, TypeKind::Int { bits: b }) => match (a, b) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a <= b,
        },
        (TypeKind::Enum { .. }, TypeKind::Int { bits }) => bits.is_none_or(|b| b >= 32),
        (
            TypeKind::Ptr {
                pointee: src_pointee,
                is_mut: src_mut,
            },
            TypeKind::Ptr {
                pointee: dst_pointee,
                is_mut: dst_mut,
            },
        ) => {
            if !*src_mut && *dst_mut {
                return false;
            }
            if src_pointee == dst_pointee {
                return true;
            }
            match (&**src_pointee, &**dst_pointee) {
                (TypeKind::Record { sym: s }, TypeKind::Record { sym: d }) => {
                    derives_from(s, d, symbols)
                }
                _ => false,
            }
        }
        (_, TypeKind::Record { sym }) => match symbols.symbol(sym) {
            Some(Symbol::Record(record)) if record.is_union => {
                record.fields.iter().any(|f| &f.ty == src)
            }
            _ => false,
        },
        _ => false,
    }
}

/// Whether an explicit `as` cast from `src` to `dst` is permitted.
pub fn castable(src: &Type, dst: &Type, symbols: &dyn SymbolSource) -> bool {
    if coerce(src, dst, symbols) {
        return true;
    }
    match (&**src, &**dst) {
        // Any scalar narrows or converts to an integer; pointers only to a
        // pointer-wide one.
        (TypeKind::Bool | TypeKind::Int { .. } | TypeKind::Enum { .. }, TypeKind::Int { .. }) => {
            true
        }
        (TypeKind::Ptr { .. }, TypeKind::Int { bits }) => *bits == Some(64),
        (TypeKind::Int { bits }, TypeKind::Ptr { .. }) => bits.is_none_or(|b| b == 64),
        (TypeKind::Ptr { pointee: a, .. }, TypeKind::Ptr { pointee: b, .. }) => {
            matches!(&**a, TypeKind::Void) || matches!(&**b, TypeKind::Void)
        }
        (TypeKind::Int { .. }, TypeKind::Enum { .. }) => true,
        _ => false,
    }
}

/// Merge two types.
///
/// Strict unification accepts only structural equality, modulo the error
/// type absorbing either side and unknown integer widths taking the known
/// one. With `strict` off this is the join operator: numeric widening,
/// pointer subtyping, union-variant coercion, and `Never` all pick the
/// common supertype.
pub fn unify(
    a: &Type,
    b: &Type,
    strict: bool,
    types: &mut TypeInterner,
    symbols: &dyn SymbolSource,
) -> Option<Type> {
    if a == b {
        return Some(a.clone());
    }
    match (&**a, &**b) {
        (TypeKind::Err, _) => return Some(b.clone()),
        (_, TypeKind::Err) => return Some(a.clone()),
        (TypeKind::Int { bits: None }, TypeKind::Int { .. }) => return Some(b.clone()),
        (TypeKind::Int { bits: _ }, TypeKind::Int { bits: None }) => return Some(a.clone()),
        (
            TypeKind::Ptr {
                pointee: pa,
                is_mut: ma,
            },
            TypeKind::Ptr {
                pointee: pb,
                is_mut: mb,
            },
        ) if pa == pb => {
            // Mutability joins by or; a strict caller treats the mismatch
            // as an error.
            if strict {
                return None;
            }
            return Some(types.ptr(pa.clone(), *ma || *mb));
        }
        (
            TypeKind::Arr {
                elem: ea,
                size: sa,
            },
            TypeKind::Arr {
                elem: eb,
                size: sb,
            },
        ) => {
            let elem = unify(ea, eb, strict, types, symbols)?;
            let size = match (sa, sb) {
                (Some(x), Some(y)) if x == y => Some(*x),
                (Some(x), None) | (None, Some(x)) => Some(*x),
                (None, None) => None,
                _ => return None,
            };
            return Some(types.array(elem, size));
        }
        _ => {}
    }
    if strict {
        return None;
    }
    if coerce(a, b, symbols) {
        return Some(b.clone());
    }
    if coerce(b, a, symbols) {
        return Some(a.clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_symbols() -> crate::semantic::SymbolMap {
        crate::semantic::SymbolMap::default()
    }

    #[test]
    fn test_interning_is_canonical() {
        let mut types = TypeInterner::new();
        let a = types.ptr(types.int(Some(32)), false);
        let b = types.ptr(types.int(Some(32)), false);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_unify_is_reflexive() {
        let mut types = TypeInterner::new();
        let symbols = empty_symbols();
        for ty in [
            types.void(),
            types.bool_(),
            types.int(Some(8)),
            types.ptr(types.bool_(), true),
        ] {
            assert_eq!(
                unify(&ty, &ty, true, &mut types, &symbols),
                Some(ty.clone())
            );
        }
    }

    #[test]
    fn test_unknown_int_takes_known_width() {
        let mut types = TypeInterner::new();
        let symbols = empty_symbols();
        let merged = unify(
            &types.int(None),
            &types.int(Some(16)),
            true,
            &mut types,
            &symbols,
        );
        assert_eq!(merged, Some(types.int(Some(16))));
    }

    #[test]
    fn test_strict_rejects_mut_mismatch() {
        let mut types = TypeInterner::new();
        let symbols = empty_symbols();
        let p = types.ptr(types.int(Some(8)), false);
        let pm = types.ptr(types.int(Some(8)), true);
        assert_eq!(unify(&p, &pm, true, &mut types, &symbols), None);
        let joined = unify(&p, &pm, false, &mut types, &symbols).unwrap();
        assert_eq!(joined, types.ptr(types.int(Some(8)), true));
    }

    #[test]
    fn test_widening_coercion() {
        let types = TypeInterner::new();
        let symbols = empty_symbols();
        assert!(coerce(&types.int(Some(8)), &types.int(Some(32)), &symbols));
        assert!(!coerce(&types.int(Some(32)), &types.int(Some(8)), &symbols));
        assert!(coerce(&types.never(), &types.bool_(), &symbols));
    }

    #[test]
    fn test_castable_pointers() {
        let mut types = TypeInterner::new();
        let symbols = empty_symbols();
        let void_ptr = types.ptr(types.void(), false);
        let int_ptr = types.ptr(types.int(Some(32)), false);
        assert!(castable(&int_ptr, &void_ptr, &symbols));
        assert!(castable(&void_ptr, &int_ptr, &symbols));
        assert!(castable(&int_ptr, &types.int(Some(64)), &symbols));
        assert!(!castable(&int_ptr, &types.int(Some(32)), &symbols));
    }

    #[test]
    fn test_layout_scalars() {
        let types = TypeInterner::new();
        let symbols = empty_symbols();
        assert_eq!(
            layout_of(&types.int(Some(32)), &symbols),
            Some(Layout { size: 4, align: 4 })
        );
        assert_eq!(layout_of(&types.void(), &symbols), None);
        assert_eq!(layout_of(&types.err(), &symbols), None);
    }

    use super::super::symbol::{FieldSig, RecordSymbol, SymbolMap, record_qname};
    use smol_str::SmolStr;

    fn insert_record(
        symbols: &mut SymbolMap,
        name: &str,
        is_union: bool,
        base: Option<&str>,
        fields: &[(&str, Type)],
    ) -> QualifiedName {
        let qname = record_qname(name);
        let fields = fields
            .iter()
            .map(|(field_name, ty)| FieldSig {
                name: SmolStr::new(field_name),
                qname: SmolStr::new(format!("{name}.{field_name}")),
                ty: ty.clone(),
                default: None,
                from_base: false,
            })
            .collect();
        symbols.insert(
            qname.clone(),
            Symbol::Record(RecordSymbol {
                name: SmolStr::new(name),
                qname: qname.clone(),
                is_union,
                base: base.map(record_qname),
                fields,
                origins: Vec::new(),
                is_defined: true,
            }),
        );
        qname
    }

    #[test]
    fn test_struct_layout_pads_to_alignment() {
        let mut types = TypeInterner::new();
        let mut symbols = empty_symbols();
        let q = insert_record(
            &mut symbols,
            "Mixed",
            false,
            None,
            &[("a", types.int(Some(8))), ("b", types.int(Some(64)))],
        );
        let ty = types.record(q);
        assert_eq!(layout_of(&ty, &symbols), Some(Layout { size: 16, align: 8 }));
    }

    #[test]
    fn test_union_layout_takes_max() {
        let mut types = TypeInterner::new();
        let mut symbols = empty_symbols();
        let q = insert_record(
            &mut symbols,
            "Value",
            true,
            None,
            &[("a", types.int(Some(8))), ("b", types.int(Some(64)))],
        );
        let ty = types.record(q);
        assert_eq!(layout_of(&ty, &symbols), Some(Layout { size: 8, align: 8 }));
    }

    #[test]
    fn test_incomplete_record_is_unsized() {
        let mut types = TypeInterner::new();
        let mut symbols = empty_symbols();
        let q = insert_record(&mut symbols, "Open", false, None, &[]);
        if let Some(Symbol::Record(record)) = symbols.get_mut(&q) {
            record.is_defined = false;
        }
        let ty = types.record(q);
        assert_eq!(layout_of(&ty, &symbols), None);
        // An array of an unsized element is unsized too.
        let arr = types.array(ty, Some(4));
        assert_eq!(layout_of(&arr, &symbols), None);
    }

    #[test]
    fn test_union_variant_coercion() {
        let mut types = TypeInterner::new();
        let mut symbols = empty_symbols();
        let q = insert_record(
            &mut symbols,
            "Value",
            true,
            None,
            &[("i", types.int(Some(64))), ("flag", types.bool_())],
        );
        let union_ty = types.record(q);
        assert!(coerce(&types.int(Some(64)), &union_ty, &symbols));
        assert!(coerce(&types.bool_(), &union_ty, &symbols));
        // Field types match exactly; no widening on the way in.
        assert!(!coerce(&types.int(Some(8)), &union_ty, &symbols));
    }

    #[test]
    fn test_pointer_subtype_coercion() {
        let mut types = TypeInterner::new();
        let mut symbols = empty_symbols();
        let base = insert_record(&mut symbols, "Base", false, None, &[("id", types.int(Some(32)))]);
        let derived = insert_record(
            &mut symbols,
            "Derived",
            false,
            Some("Base"),
            &[("id", types.int(Some(32))), ("extra", types.int(Some(32)))],
        );
        let base_record = types.record(base.clone());
        let base_ptr = types.ptr(base_record, false);
        let derived_record = types.record(derived.clone());
        let derived_ptr = types.ptr(derived_record, false);
        assert!(coerce(&derived_ptr, &base_ptr, &symbols));
        assert!(!coerce(&base_ptr, &derived_ptr, &symbols));
        // Dropping mut is fine, gaining it is not.
        let derived_record = types.record(derived);
        let derived_mut = types.ptr(derived_record, true);
        assert!(coerce(&derived_mut, &base_ptr, &symbols));
        let base_record = types.record(base);
        let base_mut = types.ptr(base_record, true);
        assert!(!coerce(&derived_ptr, &base_mut, &symbols));
    }
}
