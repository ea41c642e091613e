//! Declaration and definition of top-level symbols.
//!
//! Declaration happens in two sweeps (types and constants, then functions
//! and globals); definition runs in declaration order and is also reachable
//! lazily through the `ensure_*` entry points in the parent module.

use num_bigint::BigInt;
use num_traits::Zero;
use rowan::TextRange;
use smol_str::SmolStr;

use super::super::const_eval::checked_mk_int;
use super::super::symbol::{
    ConstSymbol, ConstValue, EnumSymbol, FieldSig, FieldSymbol, FuncSymbol, GlobalSymbol, Origin,
    ParamSig, ParamSymbol, QualifiedName, RecordSymbol, Symbol, const_qname, enum_qname,
    field_qname, func_qname, global_qname, param_qname, record_qname,
};
use super::super::ty::{Type, TypeKind};
use super::{Elaborator, FuncCtx};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxNode, SyntaxNodePtr};

impl Elaborator<'_> {
    pub(crate) fn origin(
        &self,
        node: &SyntaxNode,
        name_range: Option<TextRange>,
        is_forward_decl: bool,
    ) -> Origin {
        Origin {
            file: self.current_file.clone(),
            node: SyntaxNodePtr::new(node),
            name_range,
            is_forward_decl,
        }
    }

    /// Declare a top-level symbol, merging with an existing declaration of
    /// the same name.
    ///
    /// Same kind with a compatible signature attaches a new origin; an
    /// incompatible signature keeps the first declaration and reports. A
    /// different kind under the same name reports and proceeds with the
    /// fresh symbol, leaving the first name binding in place.
    fn declare_top(
        &mut self,
        name: &SmolStr,
        name_range: Option<TextRange>,
        node: &SyntaxNode,
        mut symbol: Symbol,
        is_forward_decl: bool,
    ) -> QualifiedName {
        let qname = symbol.qualified_name().clone();
        let origin = self.origin(node, name_range, is_forward_decl);
        if self.result.symbols.contains_key(&qname) {
            let message = {
                let existing = &self.result.symbols[&qname];
                redeclaration_error(existing, &symbol)
            };
            match message {
                None => {
                    let existing = self.result.symbols.get_mut(&qname).unwrap();
                    existing.origins_mut().push(origin);
                }
                Some(message) => {
                    let range = name_range.unwrap_or_else(|| node.text_range());
                    self.error(range, message);
                }
            }
        } else {
            let root = self.result.root_scope;
            if self.result.scopes.get_name(root, name).is_some() {
                let range = name_range.unwrap_or_else(|| node.text_range());
                self.error(
                    range,
                    format!("another symbol with the same name '{name}' already exists"),
                );
            } else {
                self.result.scopes.add(root, name.clone(), qname.clone());
            }
            symbol.origins_mut().push(origin);
            self.result.symbols.insert(qname.clone(), symbol);
        }
        self.record_node_symbol(node, &qname);
        if let Some(range) = name_range {
            self.record_ref(&qname, range, true);
        }
        qname
    }

    // =========================================================================
    // Sweep 1a: types and constants
    // =========================================================================

    pub(super) fn declare_record(&mut self, decl: &ast::RecordDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let name = SmolStr::new(token.text());
        let symbol = Symbol::Record(RecordSymbol {
            name: name.clone(),
            qname: record_qname(&name),
            is_union: decl.is_union(),
            base: None,
            fields: Vec::new(),
            origins: Vec::new(),
            is_defined: false,
        });
        let qname = self.declare_top(&name, Some(token.text_range()), decl.syntax(), symbol, false);
        let file = self.current_file.clone();
        self.record_decls
            .entry(qname)
            .or_insert_with(|| (file, decl.clone()));
    }

    pub(super) fn declare_enum(&mut self, decl: &ast::EnumDecl) {
        let name_token = decl.name_token();
        let name = match &name_token {
            Some(token) => SmolStr::new(token.text()),
            None => {
                self.anon_enums += 1;
                SmolStr::new(format!("<anonymous:{}>", self.anon_enums))
            }
        };
        let qname = enum_qname(&name);
        let symbol = Symbol::Enum(EnumSymbol {
            name: name.clone(),
            qname: qname.clone(),
            members: Vec::new(),
            origins: Vec::new(),
            is_defined: false,
        });
        let qname = if let Some(token) = &name_token {
            self.declare_top(&name, Some(token.text_range()), decl.syntax(), symbol, false)
        } else {
            let mut symbol = symbol;
            symbol
                .origins_mut()
                .push(self.origin(decl.syntax(), None, false));
            self.result.symbols.insert(qname.clone(), symbol);
            self.record_node_symbol(decl.syntax(), &qname);
            qname
        };
        let file = self.current_file.clone();
        self.enum_decls
            .entry(qname.clone())
            .or_insert_with(|| (file, decl.clone()));

        // Members are constants of the enum's type, visible at the root
        // scope; their values are filled in when the enum is defined.
        let enum_ty = self.types.enum_type(qname.clone());
        for member in decl.members() {
            let Some(token) = member.name_token() else {
                continue;
            };
            let member_name = SmolStr::new(token.text());
            let symbol = Symbol::Const(ConstSymbol {
                name: member_name.clone(),
                qname: const_qname(&member_name),
                ty: enum_ty.clone(),
                value: None,
                owner: Some(qname.clone()),
                origins: Vec::new(),
            });
            self.declare_top(
                &member_name,
                Some(token.text_range()),
                member.syntax(),
                symbol,
                false,
            );
        }
    }

    pub(super) fn declare_const(&mut self, decl: &ast::ConstDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let name = SmolStr::new(token.text());
        let symbol = Symbol::Const(ConstSymbol {
            name: name.clone(),
            qname: const_qname(&name),
            ty: self.types.err(),
            value: None,
            owner: None,
            origins: Vec::new(),
        });
        let qname = self.declare_top(&name, Some(token.text_range()), decl.syntax(), symbol, false);
        let file = self.current_file.clone();
        self.const_decls
            .entry(qname)
            .or_insert_with(|| (file, decl.clone()));
    }

    // =========================================================================
    // Sweep 1b: functions and globals
    // =========================================================================

    pub(super) fn declare_func(&mut self, decl: &ast::FuncDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let name = SmolStr::new(token.text());
        let qname = func_qname(&name);
        let mut params = Vec::new();
        let mut is_variadic = false;
        for (index, param) in decl.params().enumerate() {
            let ty = match param.ty() {
                Some(node) => self.eval_type(&node),
                None => self.types.err(),
            };
            let is_rest = matches!(&*ty, TypeKind::RestParam);
            is_variadic |= is_rest;
            params.push(ParamSig {
                name: param.name(),
                qname: param_qname(&qname, index as u32),
                ty,
                has_default: param.default_value().is_some(),
                is_rest,
            });
        }
        let return_ty = match decl.return_type() {
            Some(node) => self.eval_type(&node),
            None => self.types.void(),
        };
        let symbol = Symbol::Func(FuncSymbol {
            name: name.clone(),
            qname,
            params,
            return_ty,
            is_variadic,
            is_extern: decl.is_extern(),
            origins: Vec::new(),
            is_defined: false,
        });
        self.declare_top(
            &name,
            Some(token.text_range()),
            decl.syntax(),
            symbol,
            decl.body().is_none(),
        );
    }

    pub(super) fn declare_global(&mut self, decl: &ast::GlobalDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let name = SmolStr::new(token.text());
        let ty = match decl.ty() {
            Some(node) => self.eval_type(&node),
            None => self.types.err(),
        };
        let symbol = Symbol::Global(GlobalSymbol {
            name: name.clone(),
            qname: global_qname(&name),
            ty,
            is_extern: decl.is_extern(),
            origins: Vec::new(),
            is_defined: false,
        });
        self.declare_top(
            &name,
            Some(token.text_range()),
            decl.syntax(),
            symbol,
            decl.is_extern(),
        );
    }

    // =========================================================================
    // Sweep 2: definitions
    // =========================================================================

    pub(super) fn define_record_decl(&mut self, decl: &ast::RecordDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let qname = record_qname(token.text());
        match self.record_decls.get(&qname) {
            Some((_, first)) if first == decl => self.ensure_record_defined(&qname),
            Some(_) => {
                let message = format!("Redefinition of '{}'.", token.text());
                self.error(token.text_range(), message);
            }
            None => {}
        }
    }

    pub(super) fn define_enum_decl(&mut self, decl: &ast::EnumDecl) {
        let qname = match decl.name_token() {
            Some(token) => enum_qname(token.text()),
            // Anonymous enums are keyed by their declaration node.
            None => match self
                .enum_decls
                .iter()
                .find(|(_, (_, d))| d == decl)
                .map(|(q, _)| q.clone())
            {
                Some(q) => q,
                None => return,
            },
        };
        match self.enum_decls.get(&qname) {
            Some((_, first)) if first == decl => self.ensure_enum_defined(&qname),
            Some(_) => {
                let name = decl.name_token().map(|t| t.text().to_string());
                if let (Some(name), Some(token)) = (name, decl.name_token()) {
                    self.error(token.text_range(), format!("Redefinition of '{name}'."));
                }
            }
            None => {}
        }
    }

    pub(super) fn define_const_decl(&mut self, decl: &ast::ConstDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let qname = const_qname(token.text());
        match self.const_decls.get(&qname) {
            Some((_, first)) if first == decl => self.ensure_const_defined(&qname),
            Some(_) => {
                let message = format!("Redefinition of '{}'.", token.text());
                self.error(token.text_range(), message);
            }
            None => {}
        }
    }

    pub(super) fn define_record(&mut self, decl: &ast::RecordDecl, qname: &QualifiedName) {
        let record_name = decl.name();
        let mut fields: Vec<FieldSig> = Vec::new();
        let mut base: Option<QualifiedName> = None;

        if let Some(base_node) = decl.base_type() {
            let base_ty = self.eval_type(&base_node);
            match &*base_ty {
                TypeKind::Record { sym } if sym == qname => {
                    self.error(
                        base_node.range(),
                        format!("record '{record_name}' cannot inherit from itself"),
                    );
                }
                TypeKind::Record { sym } => {
                    let sym = sym.clone();
                    self.ensure_record_defined(&sym);
                    match self.lookup_symbol(&sym).cloned() {
                        Some(Symbol::Record(base_record)) => {
                            if !base_record.is_defined {
                                self.error(
                                    base_node.range(),
                                    format!("base record '{}' is incomplete", base_record.name),
                                );
                            } else if base_record.is_union != decl.is_union()
                                && base_record.fields.len() != 1
                            {
                                self.error(
                                    base_node.range(),
                                    format!("invalid base record '{}'", base_record.name),
                                );
                            } else {
                                base = Some(sym);
                                for field in &base_record.fields {
                                    let inherited_qname =
                                        field_qname(&record_name, &field.name);
                                    let origins = self
                                        .lookup_symbol(&field.qname)
                                        .map(|s| s.origins().to_vec())
                                        .unwrap_or_default();
                                    self.result.symbols.insert(
                                        inherited_qname.clone(),
                                        Symbol::RecordField(FieldSymbol {
                                            name: field.name.clone(),
                                            qname: inherited_qname.clone(),
                                            owner: qname.clone(),
                                            ty: field.ty.clone(),
                                            origins,
                                        }),
                                    );
                                    fields.push(FieldSig {
                                        name: field.name.clone(),
                                        qname: inherited_qname,
                                        ty: field.ty.clone(),
                                        default: field.default.clone(),
                                        from_base: true,
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
                TypeKind::Err => {}
                other => {
                    let message = format!("expected record type, got '{other}'");
                    self.error(base_node.range(), message);
                }
            }
        }

        for field in decl.fields() {
            let Some(token) = field.name_token() else {
                continue;
            };
            let field_name = SmolStr::new(token.text());
            if fields.iter().any(|f| f.name == field_name) {
                self.error(
                    token.text_range(),
                    format!("Redefinition of '{field_name}'."),
                );
                continue;
            }
            let annotated = field.ty().map(|t| self.eval_type(&t));
            let default_expr = field.default_value();
            let ty = match (&annotated, &default_expr) {
                (Some(ty), Some(expr)) => {
                    let ty = ty.clone();
                    self.check_expr_coerce(expr, &ty);
                    ty
                }
                (Some(ty), None) => ty.clone(),
                (None, Some(expr)) => self.check_expr(expr, None),
                (None, None) => {
                    self.error(
                        token.text_range(),
                        format!("field '{field_name}' has no type"),
                    );
                    self.types.err()
                }
            };
            self.ensure_type_defined(&ty);
            if !ty.is_error() && !self.is_sized(&ty) {
                self.error(
                    token.text_range(),
                    format!("field '{field_name}' has incomplete type"),
                );
            }
            let default = default_expr.as_ref().and_then(|expr| {
                let value = self.eval_const(expr);
                if value.is_none() {
                    self.error(expr.range(), "constant expression expected");
                }
                value
            });
            let fq = field_qname(&record_name, &field_name);
            self.result.symbols.insert(
                fq.clone(),
                Symbol::RecordField(FieldSymbol {
                    name: field_name.clone(),
                    qname: fq.clone(),
                    owner: qname.clone(),
                    ty: ty.clone(),
                    origins: vec![self.origin(
                        field.syntax(),
                        Some(token.text_range()),
                        false,
                    )],
                }),
            );
            self.record_node_symbol(field.syntax(), &fq);
            self.record_ref(&fq, token.text_range(), true);
            fields.push(FieldSig {
                name: field_name,
                qname: fq,
                ty,
                default,
                from_base: false,
            });
        }

        if fields.is_empty() {
            let range = decl
                .name_token()
                .map(|t| t.text_range())
                .unwrap_or_else(|| decl.range());
            self.error(range, "record must have at least one field");
        }

        if let Some(Symbol::Record(record)) = self.result.symbols.get_mut(qname) {
            record.base = base;
            record.fields = fields;
            record.is_defined = true;
        }
    }

    pub(super) fn define_enum(&mut self, decl: &ast::EnumDecl, qname: &QualifiedName) {
        let enum_ty = self.types.enum_type(qname.clone());
        let int32 = self.types.int(Some(32));
        let mut next = BigInt::zero();
        let mut members = Vec::new();
        for member in decl.members() {
            let Some(token) = member.name_token() else {
                continue;
            };
            let value = match member.value() {
                Some(expr) => {
                    self.check_expr_coerce(&expr, &int32);
                    match self.eval_const(&expr) {
                        Some(ConstValue::Int(v, _)) => v,
                        Some(_) | None => {
                            self.error(expr.range(), "constant expression expected");
                            next.clone()
                        }
                    }
                }
                None => next.clone(),
            };
            let const_value = match checked_mk_int(value.clone(), int32.clone()) {
                Some(ConstValue::Int(v, _)) => Some(ConstValue::Int(v, enum_ty.clone())),
                _ => {
                    self.error(token.text_range(), "enum member value out of range");
                    None
                }
            };
            next = value + 1;
            let member_qname = const_qname(token.text());
            if let Some(Symbol::Const(symbol)) = self.result.symbols.get_mut(&member_qname) {
                if symbol.owner.as_ref() == Some(qname) {
                    symbol.value = const_value;
                    symbol.ty = enum_ty.clone();
                }
            }
            members.push(member_qname);
        }
        if let Some(Symbol::Enum(symbol)) = self.result.symbols.get_mut(qname) {
            symbol.members = members;
            symbol.is_defined = true;
        }
    }

    pub(super) fn define_const(&mut self, decl: &ast::ConstDecl, qname: &QualifiedName) {
        let annotated = decl.ty().map(|t| self.eval_type(&t));
        if let Some(ty) = &annotated {
            if !ty.is_scalar() && !ty.is_error() {
                let range = decl.ty().map(|t| t.range()).unwrap_or_else(|| decl.range());
                self.error(range, "constant must have a scalar type");
            }
        }
        let value_expr = decl.value();
        let value_ty = value_expr.as_ref().map(|expr| match &annotated {
            Some(ty) => self.check_expr_coerce(expr, ty),
            None => self.check_expr(expr, None),
        });
        let ty = annotated.or(value_ty).unwrap_or_else(|| self.types.err());

        let mut value = value_expr.as_ref().and_then(|expr| self.eval_const(expr));
        if value.is_none() {
            if let Some(expr) = &value_expr {
                self.error(expr.range(), "constant expression expected");
            }
        }
        // Re-type integer values at the declared type.
        if let Some(ConstValue::Int(v, _)) = &value {
            if matches!(&*ty, TypeKind::Int { .. } | TypeKind::Enum { .. }) {
                value = checked_mk_int(v.clone(), ty.clone());
                if value.is_none() {
                    if let Some(expr) = &value_expr {
                        self.error(expr.range(), format!("constant value does not fit '{ty}'"));
                    }
                }
            }
        }
        if let Some(Symbol::Const(symbol)) = self.result.symbols.get_mut(qname) {
            if symbol.owner.is_none() {
                symbol.ty = ty;
                symbol.value = value;
            }
        }
    }

    pub(super) fn define_func(&mut self, decl: &ast::FuncDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let name = SmolStr::new(token.text());
        let qname = func_qname(&name);
        let Some(Symbol::Func(func)) = self.result.symbols.get(&qname).cloned() else {
            return;
        };

        let previous_scope = self.push_scope(decl.syntax());
        let param_count = decl.params().count();
        let mut seen_default = false;
        for (index, param) in decl.params().enumerate() {
            let ty = param
                .ty()
                .and_then(|t| self.node_type(t.syntax()))
                .unwrap_or_else(|| self.types.err());
            let is_rest = matches!(&*ty, TypeKind::RestParam);
            if is_rest && index + 1 != param_count {
                self.error(param.range(), "variadic parameter must be last");
            }
            if param.default_value().is_some() {
                seen_default = true;
            } else if seen_default && !is_rest {
                self.error(
                    param.range(),
                    "non-default parameter cannot follow a default parameter",
                );
            }
            if !is_rest {
                self.ensure_type_defined(&ty);
                if !ty.is_error() && !self.is_sized(&ty) {
                    let message =
                        format!("parameter '{}' has incomplete type", param.name());
                    self.error(param.range(), message);
                }
            }
            if let Some(default) = param.default_value() {
                self.check_expr_coerce(&default, &ty);
                if self.eval_const(&default).is_none() {
                    self.error(default.range(), "constant expression expected");
                }
            }
            if let Some(param_token) = param.name_token() {
                let param_name = SmolStr::new(param_token.text());
                let param_q = param_qname(&qname, index as u32);
                if self
                    .result
                    .scopes
                    .get_name(self.current_scope, &param_name)
                    .is_some()
                {
                    self.error(
                        param_token.text_range(),
                        format!("another symbol with the same name '{param_name}' already exists"),
                    );
                } else {
                    self.result
                        .scopes
                        .add(self.current_scope, param_name.clone(), param_q.clone());
                }
                self.result.symbols.insert(
                    param_q.clone(),
                    Symbol::FuncParam(ParamSymbol {
                        name: param_name,
                        qname: param_q.clone(),
                        ty: ty.clone(),
                        index: index as u32,
                        origins: vec![self.origin(
                            param.syntax(),
                            Some(param_token.text_range()),
                            false,
                        )],
                    }),
                );
                self.record_node_symbol(param.syntax(), &param_q);
                self.record_ref(&param_q, param_token.text_range(), true);
            }
        }

        let return_ty = func.return_ty.clone();
        self.ensure_type_defined(&return_ty);
        let return_ok = matches!(
            &*return_ty,
            TypeKind::Void | TypeKind::Never | TypeKind::Err
        ) || self.is_sized(&return_ty);
        if !return_ok {
            let range = decl
                .return_type()
                .map(|t| t.range())
                .unwrap_or_else(|| token.text_range());
            self.error(range, "return type must be sized");
        }

        if name == "main" && !self.main_signature_ok(&func) {
            self.error(token.text_range(), "invalid signature for 'main'");
        }

        if let Some(body) = decl.body() {
            let already_defined =
                matches!(self.result.symbols.get(&qname), Some(Symbol::Func(f)) if f.is_defined);
            if already_defined {
                self.error(token.text_range(), format!("Redefinition of '{name}'."));
            } else {
                self.func = Some(FuncCtx {
                    qname: qname.clone(),
                    name: name.clone(),
                    return_ty,
                    local_counter: 0,
                });
                self.check_block(&body);
                self.func = None;
                if let Some(Symbol::Func(f)) = self.result.symbols.get_mut(&qname) {
                    f.is_defined = true;
                }
                self.result
                    .functions
                    .push((self.current_file.clone(), SyntaxNodePtr::new(decl.syntax())));
            }
        }
        self.pop_scope(previous_scope);
    }

    fn main_signature_ok(&mut self, func: &FuncSymbol) -> bool {
        if func.is_variadic || func.return_ty != self.types.int(Some(32)) {
            return false;
        }
        match func.params.len() {
            0 => true,
            2 => {
                let argv = {
                    let char_ptr = self.types.ptr(self.types.int(Some(8)), false);
                    self.types.ptr(char_ptr, false)
                };
                func.params[0].ty == self.types.int(Some(32)) && func.params[1].ty == argv
            }
            _ => false,
        }
    }

    pub(super) fn define_global(&mut self, decl: &ast::GlobalDecl) {
        let Some(token) = decl.name_token() else {
            return;
        };
        let name = SmolStr::new(token.text());
        let qname = global_qname(&name);
        let Some(Symbol::Global(global)) = self.result.symbols.get(&qname).cloned() else {
            return;
        };
        self.ensure_type_defined(&global.ty);
        if !global.ty.is_error() && !self.is_sized(&global.ty) {
            let range = decl
                .ty()
                .map(|t| t.range())
                .unwrap_or_else(|| token.text_range());
            self.error(range, format!("global '{name}' has incomplete type"));
        }
        if !decl.is_extern() {
            if global.is_defined {
                self.error(token.text_range(), format!("Redefinition of '{name}'."));
            } else if let Some(Symbol::Global(g)) = self.result.symbols.get_mut(&qname) {
                g.is_defined = true;
            }
        }
    }

    pub(crate) fn ensure_type_defined(&mut self, ty: &Type) {
        match &**ty {
            TypeKind::Record { sym } => {
                let sym = sym.clone();
                self.ensure_record_defined(&sym);
            }
            TypeKind::Enum { sym } => {
                let sym = sym.clone();
                self.ensure_enum_defined(&sym);
            }
            TypeKind::Arr { elem, .. } => self.ensure_type_defined(elem),
            TypeKind::Ptr { .. }
            | TypeKind::Void
            | TypeKind::Bool
            | TypeKind::Int { .. }
            | TypeKind::Never
            | TypeKind::RestParam
            | TypeKind::Err => {}
        }
    }
}


/// Error message when a redeclaration is incompatible with the existing
/// symbol, or `None` when the declarations merge.
fn redeclaration_error(existing: &Symbol, new: &Symbol) -> Option<String> {
    match (existing, new) {
        (Symbol::Func(a), Symbol::Func(b)) => {
            let signature_eq = a.params.len() == b.params.len()
                && a.params
                    .iter()
                    .zip(&b.params)
                    .all(|(x, y)| x.ty == y.ty && x.is_rest == y.is_rest)
                && a.return_ty == b.return_ty
                && a.is_variadic == b.is_variadic;
            (!signature_eq)
                .then(|| format!("Redefinition of '{}' with different signature.", a.name))
        }
        (Symbol::Record(a), Symbol::Record(b)) => (a.is_union != b.is_union)
            .then(|| format!("Redefinition of '{}' with different signature.", a.name)),
        (Symbol::Global(a), Symbol::Global(b)) => {
            (a.ty != b.ty).then(|| format!("Redefinition of '{}' with different type.", a.name))
        }
        (Symbol::Const(a), Symbol::Const(b)) => {
            (a.owner != b.owner).then(|| format!("Redefinition of '{}'.", a.name))
        }
        _ => None,
    }
}
