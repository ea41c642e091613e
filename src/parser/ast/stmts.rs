//! Typed views of statements.

use super::{
    AstNode, Expr, Pat, TypeNode, ast_enum, ast_node, children_method, first_child_method,
    nth_child, token_method,
};
use crate::parser::{SyntaxKind, SyntaxToken};
use rowan::NodeOrToken;
use smol_str::SmolStr;

use super::items::token_text;

ast_node!(BlockStmt, BLOCK_STMT);
ast_node!(LocalDecl, LOCAL_DECL);
ast_node!(IfStmt, IF_STMT);
ast_node!(MatchStmt, MATCH_STMT);
ast_node!(MatchCase, MATCH_CASE);
ast_node!(MatchGuard, MATCH_GUARD);
ast_node!(WhileStmt, WHILE_STMT);
ast_node!(ForStmt, FOR_STMT);
ast_node!(ReturnStmt, RETURN_STMT);
ast_node!(BreakStmt, BREAK_STMT);
ast_node!(ContinueStmt, CONTINUE_STMT);
ast_node!(ExprStmt, EXPR_STMT);

ast_enum!(
    /// Any statement.
    Stmt {
        Block(BlockStmt),
        Local(LocalDecl),
        If(IfStmt),
        Match(MatchStmt),
        While(WhileStmt),
        For(ForStmt),
        Return(ReturnStmt),
        Break(BreakStmt),
        Continue(ContinueStmt),
        Expr(ExprStmt),
    }
);

impl BlockStmt {
    children_method!(stmts, Stmt);
}

impl LocalDecl {
    token_method!(name_token, IDENT);
    first_child_method!(ty, TypeNode);
    first_child_method!(init, Expr);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl IfStmt {
    first_child_method!(cond, Expr);

    pub fn then_branch(&self) -> Option<Stmt> {
        nth_child(&self.0, 0)
    }

    pub fn else_branch(&self) -> Option<Stmt> {
        nth_child(&self.0, 1)
    }
}

impl MatchStmt {
    first_child_method!(scrutinee, Expr);
    children_method!(cases, MatchCase);
}

impl MatchCase {
    first_child_method!(pattern, Pat);
    first_child_method!(guard, MatchGuard);
    children_method!(stmts, Stmt);
}

impl MatchGuard {
    first_child_method!(expr, Expr);
}

impl WhileStmt {
    first_child_method!(cond, Expr);
    first_child_method!(body, Stmt);
}

/// The four slots of a `for` head plus its body.
#[derive(Debug, Default)]
pub struct ForParts {
    pub init: Option<Stmt>,
    pub cond: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Option<Stmt>,
}

impl ForStmt {
    /// Split the children into init/cond/step/body.
    ///
    /// The init statement carries its own semicolon, so direct `;` tokens
    /// only separate the remaining slots; `)` closes the head.
    pub fn parts(&self) -> ForParts {
        let mut parts = ForParts::default();
        // 0 = init, 1 = cond, 2 = step, 3 = body
        let mut slot = 0;
        for child in self.0.children_with_tokens() {
            match child {
                NodeOrToken::Token(t) => match t.kind() {
                    SyntaxKind::SEMICOLON if slot < 2 => slot += 1,
                    SyntaxKind::R_PAREN => slot = 3,
                    _ => {}
                },
                NodeOrToken::Node(node) => {
                    if let Some(stmt) = Stmt::cast(node.clone()) {
                        if slot == 0 {
                            parts.init = Some(stmt);
                            slot = 1;
                        } else if slot == 3 && parts.body.is_none() {
                            parts.body = Some(stmt);
                        }
                    } else if let Some(expr) = Expr::cast(node) {
                        match slot {
                            1 => parts.cond = Some(expr),
                            2 => parts.step = Some(expr),
                            _ => {}
                        }
                    }
                }
            }
        }
        parts
    }
}

impl ReturnStmt {
    first_child_method!(value, Expr);

    pub fn return_token(&self) -> Option<SyntaxToken> {
        super::child_token(&self.0, SyntaxKind::RETURN_KW)
    }
}

impl ExprStmt {
    first_child_method!(expr, Expr);
}
