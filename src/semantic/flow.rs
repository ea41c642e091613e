//! Control-flow analysis.
//!
//! A second pass over each elaborated function body. One execution state is
//! threaded through statements: the exit level reached so far. The lattice
//! join is the minimum, so a path that may fall through keeps the state at
//! `None`. Produces unreachable-code hints (marked unnecessary), checks
//! `break`/`continue` placement, and reports non-void functions whose body
//! can run off the end.

use std::path::PathBuf;
use std::sync::Arc;

use crate::base::LineIndex;
use crate::parser::SyntaxKind;
use crate::parser::ast::{self, AstNode};

use super::db::Db;
use super::diagnostics::{Diagnostic, Severity};
use super::elab::{Elaboration, NodeKey};
use super::symbol::{Symbol, func_qname};
use super::ty::TypeKind;

/// How far execution has escaped at a program point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Exit {
    None = 0,
    Loop = 1,
    Function = 2,
}

impl Exit {
    fn join(self, other: Exit) -> Exit {
        self.min(other)
    }
}

/// Analyze every function body of the unit.
pub fn analyze(db: &Db<'_>, elab: &Elaboration) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (file, ptr) in &elab.functions {
        let parse = db.parse(file);
        let node = ptr.to_node(&parse.syntax());
        let Some(decl) = ast::FuncDecl::cast(node) else {
            continue;
        };
        let mut analyzer = FlowAnalyzer {
            elab,
            file: file.clone(),
            line_index: db.line_index(file),
            diagnostics: &mut diagnostics,
            loop_stack: Vec::new(),
        };
        analyzer.analyze_func(&decl);
    }
    diagnostics
}

struct FlowAnalyzer<'a> {
    elab: &'a Elaboration,
    file: PathBuf,
    line_index: Arc<LineIndex>,
    diagnostics: &'a mut Vec<Diagnostic>,
    /// One entry per enclosing loop; set when a `break` targets it.
    loop_stack: Vec<bool>,
}

impl FlowAnalyzer<'_> {
    fn analyze_func(&mut self, decl: &ast::FuncDecl) {
        let Some(body) = decl.body() else {
            return;
        };
        let state = self.analyze_block(&body);

        let qname = func_qname(&decl.name());
        let Some(Symbol::Func(func)) = self.elab.symbols.get(&qname) else {
            return;
        };
        let returns_void = matches!(&*func.return_ty, TypeKind::Void | TypeKind::Err);
        if !returns_void && state < Exit::Function {
            let range = decl
                .return_type()
                .map(|t| t.range())
                .or_else(|| decl.name_token().map(|t| t.text_range()))
                .unwrap_or_else(|| decl.range());
            self.push(
                Severity::Error,
                range,
                "function lacks ending return statement",
                false,
            );
        }
    }

    fn analyze_block(&mut self, block: &ast::BlockStmt) -> Exit {
        self.analyze_stmts(block.stmts())
    }

    /// Thread the state through a statement list, reporting the first
    /// statement that can no longer be reached.
    fn analyze_stmts(&mut self, stmts: impl Iterator<Item = ast::Stmt>) -> Exit {
        let mut state = Exit::None;
        for stmt in stmts {
            if state != Exit::None {
                self.push(
                    Severity::Hint,
                    stmt.syntax().text_range(),
                    "unreachable code",
                    true,
                );
                break;
            }
            state = self.analyze_stmt(&stmt);
        }
        state
    }

    fn analyze_stmt(&mut self, stmt: &ast::Stmt) -> Exit {
        match stmt {
            ast::Stmt::Block(block) => self.analyze_block(block),
            ast::Stmt::Local(decl) => match decl.init() {
                Some(init) if self.expr_exits(&init) => Exit::Function,
                _ => Exit::None,
            },
            ast::Stmt::Expr(expr_stmt) => match expr_stmt.expr() {
                Some(expr) if self.expr_exits(&expr) => Exit::Function,
                _ => Exit::None,
            },
            ast::Stmt::Return(_) => Exit::Function,
            ast::Stmt::Break(stmt) => {
                match self.loop_stack.last_mut() {
                    Some(broke) => *broke = true,
                    None => self.push(
                        Severity::Error,
                        stmt.range(),
                        "'break' outside of a loop",
                        false,
                    ),
                }
                Exit::Loop
            }
            ast::Stmt::Continue(stmt) => {
                if self.loop_stack.is_empty() {
                    self.push(
                        Severity::Error,
                        stmt.range(),
                        "'continue' outside of a loop",
                        false,
                    );
                }
                Exit::Loop
            }
            ast::Stmt::If(if_stmt) => self.analyze_if(if_stmt),
            ast::Stmt::While(while_stmt) => self.analyze_while(while_stmt),
            ast::Stmt::For(for_stmt) => {
                self.loop_stack.push(false);
                if let Some(body) = for_stmt.parts().body {
                    self.analyze_stmt(&body);
                }
                self.loop_stack.pop();
                // The head may run zero iterations; the body contributes
                // nothing to the post-loop state.
                Exit::None
            }
            ast::Stmt::Match(match_stmt) => self.analyze_match(match_stmt),
        }
    }

    fn analyze_if(&mut self, if_stmt: &ast::IfStmt) -> Exit {
        let cond = if_stmt.cond().and_then(|c| literal_bool(&c));
        let then_state = match if_stmt.then_branch() {
            Some(branch) if cond == Some(false) => {
                self.report_unreachable(branch.syntax().text_range());
                Exit::None
            }
            Some(branch) => self.analyze_stmt(&branch),
            None => Exit::None,
        };
        let else_state = match if_stmt.else_branch() {
            Some(branch) if cond == Some(true) => {
                self.report_unreachable(branch.syntax().text_range());
                Exit::None
            }
            Some(branch) => self.analyze_stmt(&branch),
            None => Exit::None,
        };
        then_state.join(else_state)
    }

    fn analyze_while(&mut self, while_stmt: &ast::WhileStmt) -> Exit {
        let cond = while_stmt.cond().and_then(|c| literal_bool(&c));
        self.loop_stack.push(false);
        let mut broke = false;
        if let Some(body) = while_stmt.body() {
            if cond == Some(false) {
                self.report_unreachable(body.syntax().text_range());
            } else {
                self.analyze_stmt(&body);
            }
        }
        if let Some(flag) = self.loop_stack.pop() {
            broke = flag;
        }
        // Only a loop that provably never finishes promotes the state.
        if cond == Some(true) && !broke {
            Exit::Function
        } else {
            Exit::None
        }
    }

    fn analyze_match(&mut self, match_stmt: &ast::MatchStmt) -> Exit {
        let mut exhaustive = false;
        let mut state: Option<Exit> = None;
        for case in match_stmt.cases() {
            let case_state = self.analyze_stmts(case.stmts());
            state = Some(match state {
                None => case_state,
                Some(prev) => prev.join(case_state),
            });
            if case.guard().is_none() {
                if let Some(pattern) = case.pattern() {
                    exhaustive |= pattern_is_exhaustive(&pattern);
                }
            }
        }
        if exhaustive {
            state.unwrap_or(Exit::None)
        } else {
            // Some value may match no case at all.
            Exit::None
        }
    }

    /// Whether evaluating this expression always escapes the function.
    fn expr_exits(&self, expr: &ast::Expr) -> bool {
        if self.expr_type_is_never(expr) {
            return true;
        }
        // An assignment whose right side never produces a value.
        if let ast::Expr::Binary(binary) = &expr.peel_groups() {
            if binary.op() == Some(SyntaxKind::EQ) {
                if let Some(rhs) = binary.rhs() {
                    return self.expr_type_is_never(&rhs);
                }
            }
        }
        false
    }

    fn expr_type_is_never(&self, expr: &ast::Expr) -> bool {
        let key = NodeKey::new(&self.file, expr.syntax());
        matches!(
            self.elab.node_types.get(&key).map(|t| &**t),
            Some(TypeKind::Never)
        )
    }

    fn report_unreachable(&mut self, range: rowan::TextRange) {
        self.push(Severity::Hint, range, "unreachable code", true);
    }

    fn push(
        &mut self,
        severity: Severity,
        range: rowan::TextRange,
        message: &str,
        unnecessary: bool,
    ) {
        let mut diagnostic = Diagnostic::new(
            severity,
            self.file.clone(),
            self.line_index.range(range),
            message,
        );
        diagnostic.unnecessary = unnecessary;
        self.diagnostics.push(diagnostic);
    }
}

fn literal_bool(expr: &ast::Expr) -> Option<bool> {
    match expr.peel_groups() {
        ast::Expr::Literal(literal) => match literal.token_kind() {
            Some(SyntaxKind::TRUE_KW) => Some(true),
            Some(SyntaxKind::FALSE_KW) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A case is exhaustive when its pattern matches every value: a wildcard,
/// a fully unbounded range, a binding over such a pattern, or an
/// or-pattern containing one.
fn pattern_is_exhaustive(pattern: &ast::Pat) -> bool {
    match pattern {
        ast::Pat::Wildcard(_) => true,
        ast::Pat::Range(range) => range.is_unbounded(),
        ast::Pat::Group(group) => group.inner().is_some_and(|p| pattern_is_exhaustive(&p)),
        ast::Pat::Var(var) => var.inner().is_some_and(|p| pattern_is_exhaustive(&p)),
        ast::Pat::Or(or) => or.alternatives().any(|p| pattern_is_exhaustive(&p)),
        ast::Pat::Literal(_) | ast::Pat::Name(_) => false,
    }
}
