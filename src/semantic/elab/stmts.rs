//! Statement and pattern checking.

use rowan::TextRange;
use smol_str::SmolStr;

use super::super::symbol::{ConstValue, LocalSymbol, Symbol, local_qname};
use super::super::ty::{Type, TypeKind};
use super::Elaborator;
use crate::parser::SyntaxNode;
use crate::parser::ast::{self, AstNode};

impl Elaborator<'_> {
    pub(crate) fn check_block(&mut self, block: &ast::BlockStmt) {
        let previous = self.push_scope(block.syntax());
        for stmt in block.stmts() {
            self.check_stmt(&stmt);
        }
        self.pop_scope(previous);
    }

    pub(crate) fn check_stmt(&mut self, stmt: &ast::Stmt) {
        match stmt {
            ast::Stmt::Block(block) => self.check_block(block),
            ast::Stmt::Local(decl) => self.check_local(decl),
            ast::Stmt::If(if_stmt) => {
                let previous = self.push_scope(if_stmt.syntax());
                if let Some(cond) = if_stmt.cond() {
                    let bool_ty = self.types.bool_();
                    self.check_expr_coerce(&cond, &bool_ty);
                }
                if let Some(then_branch) = if_stmt.then_branch() {
                    self.check_stmt(&then_branch);
                }
                if let Some(else_branch) = if_stmt.else_branch() {
                    self.check_stmt(&else_branch);
                }
                self.pop_scope(previous);
            }
            ast::Stmt::While(while_stmt) => {
                let previous = self.push_scope(while_stmt.syntax());
                if let Some(cond) = while_stmt.cond() {
                    let bool_ty = self.types.bool_();
                    self.check_expr_coerce(&cond, &bool_ty);
                }
                if let Some(body) = while_stmt.body() {
                    self.check_stmt(&body);
                }
                self.pop_scope(previous);
            }
            ast::Stmt::For(for_stmt) => {
                // Head slots live in the outer scope; the body block opens
                // its own nested scope.
                let previous = self.push_scope(for_stmt.syntax());
                let parts = for_stmt.parts();
                if let Some(init) = &parts.init {
                    self.check_stmt(init);
                }
                if let Some(cond) = &parts.cond {
                    let bool_ty = self.types.bool_();
                    self.check_expr_coerce(cond, &bool_ty);
                }
                if let Some(step) = &parts.step {
                    self.check_expr(step, None);
                }
                if let Some(body) = &parts.body {
                    self.check_stmt(body);
                }
                self.pop_scope(previous);
            }
            ast::Stmt::Match(match_stmt) => {
                let scrutinee_ty = match match_stmt.scrutinee() {
                    Some(scrutinee) => self.check_expr(&scrutinee, None),
                    None => self.types.err(),
                };
                for case in match_stmt.cases() {
                    let previous = self.push_scope(case.syntax());
                    if let Some(pattern) = case.pattern() {
                        self.check_pattern(&pattern, &scrutinee_ty, false);
                    }
                    if let Some(guard) = case.guard() {
                        if let Some(expr) = guard.expr() {
                            let bool_ty = self.types.bool_();
                            self.check_expr_coerce(&expr, &bool_ty);
                        }
                    }
                    for stmt in case.stmts() {
                        self.check_stmt(&stmt);
                    }
                    self.pop_scope(previous);
                }
            }
            ast::Stmt::Return(return_stmt) => {
                let Some(expected) = self.func.as_ref().map(|f| f.return_ty.clone()) else {
                    return;
                };
                match return_stmt.value() {
                    Some(value) => {
                        self.check_expr_coerce(&value, &expected);
                    }
                    None => {
                        if !matches!(&*expected, TypeKind::Void | TypeKind::Err) {
                            let message =
                                format!("type mismatch: expected '{expected}', got 'Void'");
                            self.error(return_stmt.range(), message);
                        }
                    }
                }
            }
            ast::Stmt::Break(_) | ast::Stmt::Continue(_) => {}
            ast::Stmt::Expr(expr_stmt) => {
                if let Some(expr) = expr_stmt.expr() {
                    self.check_expr(&expr, None);
                }
            }
        }
    }

    fn check_local(&mut self, decl: &ast::LocalDecl) {
        let annotated = decl.ty().map(|node| self.eval_type(&node));
        let init = decl.init();
        let ty = match (&annotated, &init) {
            (Some(ty), Some(expr)) => {
                let ty = ty.clone();
                self.check_expr_coerce(expr, &ty);
                ty
            }
            (Some(ty), None) => ty.clone(),
            (None, Some(expr)) => self.check_expr(expr, None),
            (None, None) => {
                if let Some(token) = decl.name_token() {
                    let message =
                        format!("variable '{}' needs a type or an initializer", token.text());
                    self.error(token.text_range(), message);
                }
                self.types.err()
            }
        };
        self.ensure_type_defined(&ty);
        if !ty.is_error() && !self.is_sized(&ty) {
            if let Some(token) = decl.name_token() {
                let message = format!("variable '{}' has incomplete type", token.text());
                self.error(token.text_range(), message);
            }
        }
        if let Some(token) = decl.name_token() {
            let range = token.text_range();
            let name = SmolStr::new(token.text());
            self.declare_binding(name, range, decl.syntax(), ty);
        }
    }

    /// Introduce a local symbol into the current scope.
    fn declare_binding(
        &mut self,
        name: SmolStr,
        name_range: TextRange,
        node: &SyntaxNode,
        ty: Type,
    ) {
        let Some((func_name, counter)) = self.func.as_mut().map(|f| {
            let counter = f.local_counter;
            f.local_counter += 1;
            (f.name.clone(), counter)
        }) else {
            return;
        };
        let qname = local_qname(&func_name, counter);
        let origin = self.origin(node, Some(name_range), false);
        self.result.symbols.insert(
            qname.clone(),
            Symbol::Local(LocalSymbol {
                name: name.clone(),
                qname: qname.clone(),
                ty: ty.clone(),
                origins: vec![origin],
            }),
        );
        self.result.scopes.add(self.current_scope, name, qname.clone());
        self.record_node_symbol(node, &qname);
        self.record_ref(&qname, name_range, true);
        self.set_type(node, ty);
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    pub(crate) fn check_pattern(&mut self, pattern: &ast::Pat, hint: &Type, in_or: bool) -> Type {
        let ty = match pattern {
            ast::Pat::Group(group) => group
                .inner()
                .map(|inner| self.check_pattern(&inner, hint, in_or))
                .unwrap_or_else(|| hint.clone()),
            ast::Pat::Wildcard(_) => hint.clone(),
            ast::Pat::Literal(literal) => {
                if let Some(expr) = literal.expr() {
                    self.check_expr_coerce(&expr, hint);
                }
                hint.clone()
            }
            ast::Pat::Name(name_pat) => {
                if let Some(expr) = name_pat.expr() {
                    self.check_expr_coerce(&expr, hint);
                    if let ast::Expr::Name(name_expr) = expr.peel_groups() {
                        self.require_constant(&name_expr);
                    } else if self.eval_const(&expr).is_none() {
                        self.error(expr.range(), "constant expression expected");
                    }
                }
                hint.clone()
            }
            ast::Pat::Var(var_pat) => {
                let inner_ty = var_pat
                    .inner()
                    .map(|inner| self.check_pattern(&inner, hint, in_or))
                    .unwrap_or_else(|| hint.clone());
                if let Some(token) = var_pat.name_token() {
                    if in_or {
                        self.error(
                            token.text_range(),
                            "binding is not allowed inside an or-pattern",
                        );
                    } else {
                        let name = SmolStr::new(token.text());
                        let range = token.text_range();
                        self.declare_binding(name, range, var_pat.syntax(), inner_ty.clone());
                    }
                }
                inner_ty
            }
            ast::Pat::Range(range_pat) => {
                if !hint.is_int() && !hint.is_error() {
                    let message = format!("range pattern requires an integer type, got '{hint}'");
                    self.error(range_pat.range(), message);
                }
                let (lower, upper) = range_pat.bounds();
                let lower_value = lower.as_ref().map(|expr| {
                    self.check_expr_coerce(expr, hint);
                    self.eval_const(expr)
                });
                let upper_value = upper.as_ref().map(|expr| {
                    self.check_expr_coerce(expr, hint);
                    self.eval_const(expr)
                });
                if let (Some(Some(ConstValue::Int(lo, _))), Some(Some(ConstValue::Int(hi, _)))) =
                    (lower_value, upper_value)
                {
                    if lo > hi {
                        self.warning(range_pat.range(), "empty range");
                    }
                }
                hint.clone()
            }
            ast::Pat::Or(or_pat) => {
                let mut ty: Option<Type> = None;
                for alternative in or_pat.alternatives() {
                    let alt_ty = self.check_pattern(&alternative, hint, true);
                    ty = Some(match ty {
                        None => alt_ty,
                        Some(prev) => self.unify_types(&prev, &alt_ty, false).unwrap_or_else(|| {
                            let message = format!("cannot unify '{prev}' and '{alt_ty}'");
                            self.error(alternative.range(), message);
                            self.types.err()
                        }),
                    });
                }
                ty.unwrap_or_else(|| hint.clone())
            }
        };
        self.set_type(pattern.syntax(), ty.clone());
        ty
    }

    /// A name pattern must refer to a constant.
    fn require_constant(&mut self, name_expr: &ast::NameExpr) {
        let Some(token) = name_expr.name_token() else {
            return;
        };
        if let Some(qname) = self.resolve_name(token.text()) {
            if !matches!(self.lookup_symbol(&qname), Some(Symbol::Const(_))) {
                let message = format!("'{}' is not a constant", token.text());
                self.error(token.text_range(), message);
            }
        }
    }
}
