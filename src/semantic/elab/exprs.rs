//! Expression and type-reference checking.

use num_traits::ToPrimitive;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::super::const_eval::{checked_mk_int, parse_int_literal};
use super::super::symbol::{ConstValue, Symbol};
use super::super::ty::{Type, TypeKind, castable};
use super::{Elaborator, LayeredSymbols};
use crate::parser::SyntaxKind;
use crate::parser::ast::{self, AstNode};

impl Elaborator<'_> {
    pub(crate) fn can_cast(&self, src: &Type, dst: &Type) -> bool {
        let symbols = LayeredSymbols {
            own: &self.result.symbols,
            imported: &self.import_elabs,
        };
        castable(src, dst, &symbols)
    }

    // =========================================================================
    // Type references
    // =========================================================================

    pub(crate) fn eval_type(&mut self, node: &ast::TypeNode) -> Type {
        let ty = match node {
            ast::TypeNode::Group(group) => group
                .inner()
                .map(|inner| self.eval_type(&inner))
                .unwrap_or_else(|| self.types.err()),
            ast::TypeNode::Name(name) => self.eval_name_type(name),
            ast::TypeNode::Pointer(ptr) => {
                let pointee = ptr
                    .pointee()
                    .map(|inner| self.eval_type(&inner))
                    .unwrap_or_else(|| self.types.err());
                self.types.ptr(pointee, ptr.is_mut())
            }
            ast::TypeNode::Array(array) => {
                let elem = array
                    .elem()
                    .map(|inner| self.eval_type(&inner))
                    .unwrap_or_else(|| self.types.err());
                let size = array.size().and_then(|expr| {
                    let int64 = self.types.int(Some(64));
                    self.check_expr(&expr, Some(&int64));
                    match self.eval_const(&expr) {
                        Some(ConstValue::Int(value, _)) => match value.to_u64() {
                            Some(n) => Some(n),
                            None => {
                                self.error(expr.range(), "array size must be a non-negative integer");
                                None
                            }
                        },
                        _ => {
                            self.error(expr.range(), "array size must be a constant integer");
                            None
                        }
                    }
                });
                self.types.array(elem, size)
            }
            ast::TypeNode::Typeof(typeof_) => typeof_
                .expr()
                .map(|expr| self.check_expr(&expr, None))
                .unwrap_or_else(|| self.types.err()),
            ast::TypeNode::Never(_) => self.types.never(),
            ast::TypeNode::Rest(_) => self.types.rest_param(),
        };
        self.set_type(node.syntax(), ty.clone());
        ty
    }

    fn eval_name_type(&mut self, node: &ast::NameType) -> Type {
        let Some(token) = node.name_token() else {
            return self.types.err();
        };
        let name = token.text();
        if let Some(ty) = self.types.builtin(name) {
            return ty;
        }
        let Some(qname) = self.resolve_name(name) else {
            let message = format!("unknown symbol '{name}'");
            self.error(token.text_range(), message);
            return self.types.err();
        };
        self.record_node_symbol(node.syntax(), &qname);
        self.record_ref(&qname, token.text_range(), false);
        enum Kind {
            Record,
            Enum,
            NotAType,
        }
        let kind = match self.lookup_symbol(&qname) {
            Some(Symbol::Record(_)) => Kind::Record,
            Some(Symbol::Enum(_)) => Kind::Enum,
            _ => Kind::NotAType,
        };
        match kind {
            Kind::Record => self.types.record(qname),
            Kind::Enum => self.types.enum_type(qname),
            Kind::NotAType => {
                let message = format!("'{name}' is not a type");
                self.error(token.text_range(), message);
                self.types.err()
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn check_expr(&mut self, expr: &ast::Expr, hint: Option<&Type>) -> Type {
        let ty = match expr {
            ast::Expr::Group(group) => group
                .inner()
                .map(|inner| self.check_expr(&inner, hint))
                .unwrap_or_else(|| self.types.err()),
            ast::Expr::Name(name) => self.check_name_expr(name),
            ast::Expr::Literal(literal) => self.check_literal(literal, hint),
            ast::Expr::Array(array) => self.check_array(array, hint),
            ast::Expr::Call(call) => self.check_call(call),
            ast::Expr::Index(index) => self.check_index(index),
            ast::Expr::Field(field) => self.check_field(field),
            ast::Expr::Binary(binary) => self.check_binary(binary, hint),
            ast::Expr::Unary(unary) => self.check_unary(unary, hint),
            ast::Expr::Ternary(ternary) => self.check_ternary(ternary, hint),
            ast::Expr::Cast(cast) => self.check_cast(cast),
            ast::Expr::Is(is) => self.check_is(is),
            ast::Expr::Sizeof(sizeof) => self.check_sizeof(sizeof),
            ast::Expr::Record(record) => self.check_record_expr(record),
        };
        self.set_type(expr.syntax(), ty.clone());
        ty
    }

    /// Check an expression and require it to coerce to `expected`.
    pub(crate) fn check_expr_coerce(&mut self, expr: &ast::Expr, expected: &Type) -> Type {
        let actual = self.check_expr(expr, Some(expected));
        if !self.can_coerce(&actual, expected) {
            let message = format!("type mismatch: expected '{expected}', got '{actual}'");
            self.error(expr.range(), message);
        }
        actual
    }

    fn check_name_expr(&mut self, name: &ast::NameExpr) -> Type {
        let Some(token) = name.name_token() else {
            return self.types.err();
        };
        let text = token.text();
        let Some(qname) = self.resolve_name(text) else {
            let message = format!("unknown symbol '{text}'");
            self.error(token.text_range(), message);
            return self.types.err();
        };
        self.record_node_symbol(name.syntax(), &qname);
        self.record_ref(&qname, token.text_range(), false);
        let value_type = self
            .lookup_symbol(&qname)
            .and_then(|s| s.value_type().cloned());
        match value_type {
            Some(ty) => ty,
            None => {
                let message = format!("'{text}' is not a value");
                self.error(token.text_range(), message);
                self.types.err()
            }
        }
    }

    fn check_literal(&mut self, literal: &ast::LiteralExpr, hint: Option<&Type>) -> Type {
        let Some(token) = literal.token() else {
            return self.types.err();
        };
        match token.kind() {
            SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => self.types.bool_(),
            SyntaxKind::CHAR => self.types.int(Some(8)),
            SyntaxKind::STRING => {
                let int8 = self.types.int(Some(8));
                self.types.ptr(int8, false)
            }
            SyntaxKind::NULL_KW => match hint {
                Some(ty) if matches!(&**ty, TypeKind::Ptr { .. }) => ty.clone(),
                _ => {
                    let void = self.types.void();
                    self.types.ptr(void, false)
                }
            },
            SyntaxKind::INT_NUMBER => {
                let Some(value) = parse_int_literal(token.text()) else {
                    self.error(token.text_range(), "invalid integer literal");
                    return self.types.err();
                };
                if let Some(ty) = hint {
                    if ty.is_int() && checked_mk_int(value.clone(), ty.clone()).is_some() {
                        return ty.clone();
                    }
                }
                let int64 = self.types.int(Some(64));
                if checked_mk_int(value, int64.clone()).is_none() {
                    self.error(token.text_range(), "integer literal out of range");
                }
                int64
            }
            _ => self.types.err(),
        }
    }

    fn check_array(&mut self, array: &ast::ArrayExpr, hint: Option<&Type>) -> Type {
        let elem_hint: Option<Type> = hint.and_then(|h| match &**h {
            TypeKind::Arr { elem, .. } => Some(elem.clone()),
            _ => None,
        });
        let mut elem_ty: Option<Type> = None;
        let mut count = 0u64;
        for element in array.elements() {
            count += 1;
            match &elem_ty {
                None => {
                    let ty = self.check_expr(&element, elem_hint.as_ref());
                    elem_ty = Some(ty);
                }
                Some(ty) => {
                    let ty = ty.clone();
                    self.check_expr_coerce(&element, &ty);
                }
            }
        }
        match elem_ty.or(elem_hint) {
            Some(elem) => self.types.array(elem, Some(count)),
            None => {
                self.error(array.range(), "cannot infer the type of an empty array literal");
                self.types.err()
            }
        }
    }

    fn check_unary(&mut self, unary: &ast::UnaryExpr, hint: Option<&Type>) -> Type {
        let (Some(op), Some(operand)) = (unary.op(), unary.operand()) else {
            return self.types.err();
        };
        match op {
            SyntaxKind::BANG => {
                let bool_ty = self.types.bool_();
                self.check_expr_coerce(&operand, &bool_ty);
                bool_ty
            }
            SyntaxKind::MINUS | SyntaxKind::TILDE => {
                let int_hint = hint.filter(|h| h.is_int());
                let ty = self.check_expr(&operand, int_hint);
                if self.require_int(&ty, &operand) {
                    ty
                } else {
                    self.types.err()
                }
            }
            SyntaxKind::AMP => {
                let ty = self.check_expr(&operand, None);
                self.types.ptr(ty, false)
            }
            SyntaxKind::STAR => {
                let ty = self.check_expr(&operand, None);
                match &*ty {
                    TypeKind::Ptr { pointee, .. } => pointee.clone(),
                    TypeKind::Err => self.types.err(),
                    other => {
                        let message = format!("expected pointer type, got '{other}'");
                        self.error(operand.range(), message);
                        self.types.err()
                    }
                }
            }
            _ => self.types.err(),
        }
    }

    fn require_int(&mut self, ty: &Type, expr: &ast::Expr) -> bool {
        if ty.is_int() {
            return true;
        }
        if !ty.is_error() {
            self.error(expr.range(), "expected integer expression");
        }
        false
    }

    fn check_binary(&mut self, binary: &ast::BinaryExpr, hint: Option<&Type>) -> Type {
        use SyntaxKind::*;
        let (Some(op), Some(lhs), Some(rhs)) = (binary.op(), binary.lhs(), binary.rhs()) else {
            if let Some(lhs) = binary.lhs() {
                self.check_expr(&lhs, None);
            }
            return self.types.err();
        };
        match op {
            EQ | PIPE_EQ | AMP_EQ | CARET_EQ | SHL_EQ | SHR_EQ | PLUS_EQ | MINUS_EQ | STAR_EQ
            | SLASH_EQ | PERCENT_EQ => self.check_assignment(op, &lhs, &rhs),
            PLUS | MINUS | STAR | SLASH | PERCENT | AMP | PIPE | CARET | SHL | SHR => {
                let int_hint = hint.filter(|h| h.is_int()).cloned();
                let lt = self.check_expr(&lhs, int_hint.as_ref());
                let rhs_hint = if lt.is_int() {
                    Some(lt.clone())
                } else {
                    int_hint
                };
                let rt = self.check_expr(&rhs, rhs_hint.as_ref());
                let lhs_int = self.require_int(&lt, &lhs);
                let rhs_int = self.require_int(&rt, &rhs);
                if lhs_int && rhs_int {
                    self.unify_types(&lt, &rt, false)
                        .unwrap_or_else(|| self.types.err())
                } else {
                    self.types.err()
                }
            }
            EQ_EQ | BANG_EQ | LT | LT_EQ | GT | GT_EQ => {
                let lt = self.check_expr(&lhs, None);
                let rt = self.check_expr(&rhs, Some(&lt));
                for (ty, side) in [(&lt, &lhs), (&rt, &rhs)] {
                    if !ty.is_scalar() && !ty.is_error() {
                        let message = format!("comparison requires scalar operands, got '{ty}'");
                        self.error(side.range(), message);
                    }
                }
                if self.unify_types(&lt, &rt, false).is_none() {
                    let message = format!("cannot unify '{lt}' and '{rt}'");
                    self.error(binary.range(), message);
                }
                self.types.bool_()
            }
            AMP_AMP | PIPE_PIPE => {
                let bool_ty = self.types.bool_();
                self.check_expr_coerce(&lhs, &bool_ty);
                self.check_expr_coerce(&rhs, &bool_ty);
                bool_ty
            }
            _ => self.types.err(),
        }
    }

    fn check_assignment(&mut self, op: SyntaxKind, lhs: &ast::Expr, rhs: &ast::Expr) -> Type {
        let target = lhs.peel_groups();
        let is_lvalue = match &target {
            ast::Expr::Name(_) | ast::Expr::Index(_) | ast::Expr::Field(_) => true,
            ast::Expr::Unary(unary) => unary.op() == Some(SyntaxKind::STAR),
            _ => false,
        };
        if !is_lvalue {
            self.error(lhs.range(), "expression is not assignable");
        }
        let lt = self.check_expr(lhs, None);
        if op == SyntaxKind::EQ {
            self.check_expr_coerce(rhs, &lt);
        } else {
            // Compound operators are all integer operations.
            self.require_int(&lt, lhs);
            let rhs_hint = lt.is_int().then(|| lt.clone());
            let rt = self.check_expr(rhs, rhs_hint.as_ref());
            if self.require_int(&rt, rhs) && lt.is_int() && !self.can_coerce(&rt, &lt) {
                let message = format!("type mismatch: expected '{lt}', got '{rt}'");
                self.error(rhs.range(), message);
            }
        }
        self.types.void()
    }

    fn check_ternary(&mut self, ternary: &ast::TernaryExpr, hint: Option<&Type>) -> Type {
        if let Some(cond) = ternary.cond() {
            let bool_ty = self.types.bool_();
            self.check_expr_coerce(&cond, &bool_ty);
        }
        let (Some(then_expr), Some(else_expr)) = (ternary.then_expr(), ternary.else_expr()) else {
            return self.types.err();
        };
        let tt = self.check_expr(&then_expr, hint);
        let et = self.check_expr(&else_expr, hint);
        match self.unify_types(&tt, &et, false) {
            Some(ty) => ty,
            None => {
                let message = format!("cannot unify '{tt}' and '{et}'");
                self.error(ternary.range(), message);
                self.types.err()
            }
        }
    }

    fn check_index(&mut self, index: &ast::IndexExpr) -> Type {
        let Some(base) = index.base() else {
            return self.types.err();
        };
        let base_ty = self.check_expr(&base, None);
        if let Some(subscript) = index.index() {
            let ty = self.check_expr(&subscript, None);
            self.require_int(&ty, &subscript);
        }
        match &*base_ty {
            TypeKind::Arr { elem, .. } => elem.clone(),
            TypeKind::Ptr { pointee, .. } => pointee.clone(),
            TypeKind::Err => self.types.err(),
            other => {
                let message = format!("type '{other}' is not indexable");
                self.error(base.range(), message);
                self.types.err()
            }
        }
    }

    fn check_field(&mut self, field: &ast::FieldExpr) -> Type {
        let Some(base) = field.base() else {
            return self.types.err();
        };
        let base_ty = self.check_expr(&base, None);
        let Some(token) = field.name_token() else {
            return self.types.err();
        };
        // One automatic dereference.
        let record_qname = match &*base_ty {
            TypeKind::Record { sym } => Some(sym.clone()),
            TypeKind::Ptr { pointee, .. } => match &**pointee {
                TypeKind::Record { sym } => Some(sym.clone()),
                _ => None,
            },
            TypeKind::Err => return self.types.err(),
            _ => None,
        };
        let Some(record_qname) = record_qname else {
            let message = format!("expected record type, got '{base_ty}'");
            self.error(base.range(), message);
            return self.types.err();
        };
        self.ensure_record_defined(&record_qname);
        let Some(Symbol::Record(record)) = self.lookup_symbol(&record_qname).cloned() else {
            return self.types.err();
        };
        match record.field(token.text()) {
            Some(field_sig) => {
                let qname = field_sig.qname.clone();
                let ty = field_sig.ty.clone();
                self.record_node_symbol(field.syntax(), &qname);
                self.record_ref(&qname, token.text_range(), false);
                ty
            }
            None => {
                let message =
                    format!("unknown field '{}' on record '{}'", token.text(), record.name);
                self.error(token.text_range(), message);
                self.types.err()
            }
        }
    }

    fn check_cast(&mut self, cast: &ast::CastExpr) -> Type {
        let target = cast
            .ty()
            .map(|node| self.eval_type(&node))
            .unwrap_or_else(|| self.types.err());
        let Some(operand) = cast.operand() else {
            return target;
        };
        let src = self.check_expr(&operand, Some(&target));
        if src == target && !src.is_error() {
            self.warning(cast.range(), "redundant cast");
        } else if !src.is_error() && !target.is_error() && !self.can_cast(&src, &target) {
            let message = format!("invalid cast from '{src}' to '{target}'");
            self.error(cast.range(), message);
        }
        target
    }

    fn check_is(&mut self, is: &ast::IsExpr) -> Type {
        let operand_ty = is
            .operand()
            .map(|operand| self.check_expr(&operand, None))
            .unwrap_or_else(|| self.types.err());
        if let Some(pattern) = is.pattern() {
            self.check_pattern(&pattern, &operand_ty, false);
        }
        self.types.bool_()
    }

    fn check_sizeof(&mut self, sizeof: &ast::SizeofExpr) -> Type {
        if let Some(node) = sizeof.ty() {
            let ty = self.eval_type(&node);
            self.ensure_type_defined(&ty);
            if !ty.is_error() && !self.is_sized(&ty) {
                let message = format!("expected sized type, got '{ty}'");
                self.error(node.range(), message);
            }
        }
        self.types.int(Some(64))
    }

    fn check_call(&mut self, call: &ast::CallExpr) -> Type {
        let Some(callee) = call.callee() else {
            return self.types.err();
        };
        let callee = callee.peel_groups();
        let func = match &callee {
            ast::Expr::Name(name_expr) => {
                let Some(token) = name_expr.name_token() else {
                    return self.types.err();
                };
                let text = token.text();
                let Some(qname) = self.resolve_name(text) else {
                    let message = format!("unknown symbol '{text}'");
                    self.error(token.text_range(), message);
                    return self.types.err();
                };
                self.record_node_symbol(name_expr.syntax(), &qname);
                self.record_ref(&qname, token.text_range(), false);
                match self.lookup_symbol(&qname).cloned() {
                    Some(Symbol::Func(func)) => {
                        let void = self.types.void();
                        self.set_type(name_expr.syntax(), void);
                        func
                    }
                    _ => {
                        let message = format!("'{text}' is not a function");
                        self.error(token.text_range(), message);
                        return self.types.err();
                    }
                }
            }
            other => {
                self.check_expr(other, None);
                self.error(other.range(), "expression is not a function");
                return self.types.err();
            }
        };

        // Arguments fill parameter slots positionally until a named argument
        // appears; each slot at most once; extras only for variadics.
        let positional_limit = func
            .params
            .iter()
            .position(|p| p.is_rest)
            .unwrap_or(func.params.len());
        let mut filled = vec![false; func.params.len()];
        let mut seen_named = false;
        let mut next_positional = 0usize;
        for arg in call.args() {
            let value = arg.value();
            if let Some(name_token) = arg.name_token() {
                seen_named = true;
                let param_name = name_token.text();
                match func
                    .params
                    .iter()
                    .position(|p| p.name == param_name && !p.is_rest)
                {
                    Some(index) => {
                        if filled[index] {
                            let message =
                                format!("parameter '{param_name}' is already initialized");
                            self.error(name_token.text_range(), message);
                        }
                        filled[index] = true;
                        self.record_node_symbol(arg.syntax(), &func.params[index].qname.clone());
                        if let Some(value) = value {
                            let ty = func.params[index].ty.clone();
                            self.check_expr_coerce(&value, &ty);
                        }
                    }
                    None => {
                        let message = format!("no parameter named '{param_name}'");
                        self.error(name_token.text_range(), message);
                        if let Some(value) = value {
                            self.check_expr(&value, None);
                        }
                    }
                }
            } else {
                if seen_named {
                    self.error(
                        arg.range(),
                        "Positional argument cannot follow a named argument.",
                    );
                }
                if next_positional < positional_limit {
                    let index = next_positional;
                    next_positional += 1;
                    filled[index] = true;
                    if let Some(value) = value {
                        let ty = func.params[index].ty.clone();
                        self.check_expr_coerce(&value, &ty);
                    }
                } else if func.is_variadic {
                    if let Some(value) = value {
                        let ty = self.check_expr(&value, None);
                        if matches!(&*ty, TypeKind::RestParam) {
                            self.warning(
                                value.range(),
                                "rest parameter value passed as variadic argument",
                            );
                        } else {
                            self.ensure_type_defined(&ty);
                            if !ty.is_error() && !self.is_sized(&ty) {
                                self.error(value.range(), "variadic argument has incomplete type");
                            }
                        }
                    }
                } else {
                    self.error(arg.range(), "too many arguments");
                    if let Some(value) = value {
                        self.check_expr(&value, None);
                    }
                }
            }
        }
        for (index, param) in func.params.iter().enumerate() {
            if !filled[index] && !param.has_default && !param.is_rest {
                let message = format!("missing argument for parameter '{}'", param.name);
                self.error(call.range(), message);
            }
        }
        func.return_ty.clone()
    }

    fn check_record_expr(&mut self, record_expr: &ast::RecordExpr) -> Type {
        let Some(token) = record_expr.name_token() else {
            return self.types.err();
        };
        let name = token.text();
        let Some(qname) = self.resolve_name(name) else {
            let message = format!("unknown symbol '{name}'");
            self.error(token.text_range(), message);
            return self.types.err();
        };
        self.record_node_symbol(record_expr.syntax(), &qname);
        self.record_ref(&qname, token.text_range(), false);
        self.ensure_record_defined(&qname);
        let record = match self.lookup_symbol(&qname).cloned() {
            Some(Symbol::Record(record)) => record,
            Some(_) => {
                let message = format!("'{name}' is not a record");
                self.error(token.text_range(), message);
                return self.types.err();
            }
            None => return self.types.err(),
        };
        let result = self.types.record(qname);
        if !record.is_defined {
            let message = format!("record '{name}' is incomplete");
            self.error(token.text_range(), message);
            return result;
        }

        let mut initialized: FxHashSet<SmolStr> = FxHashSet::default();
        let mut init_count = 0usize;
        for init in record_expr.inits() {
            let Some(field_token) = init.name_token() else {
                continue;
            };
            let field_name = field_token.text();
            let Some(field) = record.field(field_name).cloned() else {
                let message =
                    format!("unknown field '{field_name}' on record '{}'", record.name);
                self.error(field_token.text_range(), message);
                if let Some(value) = init.value() {
                    self.check_expr(&value, None);
                }
                continue;
            };
            if !initialized.insert(field.name.clone()) {
                let message = format!("field '{field_name}' already initialized");
                self.error(field_token.text_range(), message);
            }
            init_count += 1;
            self.record_node_symbol(init.syntax(), &field.qname);
            self.record_ref(&field.qname, field_token.text_range(), false);
            match init.value() {
                Some(value) => {
                    self.check_expr_coerce(&value, &field.ty);
                }
                None => {
                    // Shorthand: the field name doubles as a name in scope.
                    match self.resolve_name(field_name) {
                        Some(value_qname) => {
                            self.record_node_symbol(init.syntax(), &value_qname);
                            self.record_ref(&value_qname, field_token.text_range(), false);
                            let value_ty = self
                                .lookup_symbol(&value_qname)
                                .and_then(|s| s.value_type().cloned());
                            match value_ty {
                                Some(ty) => {
                                    if !self.can_coerce(&ty, &field.ty) {
                                        let message = format!(
                                            "type mismatch: expected '{}', got '{ty}'",
                                            field.ty
                                        );
                                        self.error(field_token.text_range(), message);
                                    }
                                }
                                None => {
                                    let message = format!("'{field_name}' is not a value");
                                    self.error(field_token.text_range(), message);
                                }
                            }
                        }
                        None => {
                            let message = format!("unknown symbol '{field_name}'");
                            self.error(field_token.text_range(), message);
                        }
                    }
                }
            }
        }

        if record.is_union {
            if init_count != 1 {
                self.error(
                    record_expr.range(),
                    "only one field can be initialized in a union",
                );
            }
        } else {
            for field in &record.fields {
                if !initialized.contains(&field.name) && field.default.is_none() {
                    let message = format!("field '{}' is not initialized", field.name);
                    self.error(record_expr.range(), message);
                }
            }
        }
        result
    }
}
