//! Typed views of expressions.

use smol_str::SmolStr;

use super::items::token_text;
use super::{
    AstNode, Pat, TypeNode, ast_enum, ast_node, children_method, first_child_method,
    first_real_token, has_token_method, nth_child, token_method,
};
use crate::parser::{SyntaxKind, SyntaxToken};

ast_node!(GroupExpr, GROUP_EXPR);
ast_node!(NameExpr, NAME_EXPR);
ast_node!(LiteralExpr, LITERAL_EXPR);
ast_node!(ArrayExpr, ARRAY_EXPR);
ast_node!(CallExpr, CALL_EXPR);
ast_node!(CallArg, CALL_ARG);
ast_node!(IndexExpr, INDEX_EXPR);
ast_node!(FieldExpr, FIELD_EXPR);
ast_node!(BinaryExpr, BINARY_EXPR);
ast_node!(UnaryExpr, UNARY_EXPR);
ast_node!(TernaryExpr, TERNARY_EXPR);
ast_node!(CastExpr, CAST_EXPR);
ast_node!(IsExpr, IS_EXPR);
ast_node!(SizeofExpr, SIZEOF_EXPR);
ast_node!(RecordExpr, RECORD_EXPR);
ast_node!(FieldInit, FIELD_INIT);

ast_enum!(
    /// Any expression.
    Expr {
        Group(GroupExpr),
        Name(NameExpr),
        Literal(LiteralExpr),
        Array(ArrayExpr),
        Call(CallExpr),
        Index(IndexExpr),
        Field(FieldExpr),
        Binary(BinaryExpr),
        Unary(UnaryExpr),
        Ternary(TernaryExpr),
        Cast(CastExpr),
        Is(IsExpr),
        Sizeof(SizeofExpr),
        Record(RecordExpr),
    }
);

impl Expr {
    /// Strip grouping parentheses.
    pub fn peel_groups(&self) -> Expr {
        let mut expr = self.clone();
        while let Expr::Group(group) = &expr {
            match group.inner() {
                Some(inner) => expr = inner,
                None => break,
            }
        }
        expr
    }
}

impl GroupExpr {
    first_child_method!(inner, Expr);
}

impl NameExpr {
    token_method!(name_token, IDENT);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl LiteralExpr {
    /// The literal token itself: a number, string, character, `true`,
    /// `false`, or `null`.
    pub fn token(&self) -> Option<SyntaxToken> {
        first_real_token(&self.0)
    }

    pub fn token_kind(&self) -> Option<SyntaxKind> {
        self.token().map(|t| t.kind())
    }
}

impl ArrayExpr {
    children_method!(elements, Expr);
}

impl CallExpr {
    first_child_method!(callee, Expr);
    children_method!(args, CallArg);
}

impl CallArg {
    /// Label of a named argument; positional arguments have none.
    token_method!(name_token, IDENT);
    first_child_method!(value, Expr);
}

impl IndexExpr {
    pub fn base(&self) -> Option<Expr> {
        nth_child(&self.0, 0)
    }

    pub fn index(&self) -> Option<Expr> {
        nth_child(&self.0, 1)
    }
}

impl FieldExpr {
    first_child_method!(base, Expr);
    token_method!(name_token, IDENT);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl BinaryExpr {
    /// The operator token; sub-expressions are nodes, so the first real
    /// direct token is the operator.
    pub fn op_token(&self) -> Option<SyntaxToken> {
        first_real_token(&self.0)
    }

    pub fn op(&self) -> Option<SyntaxKind> {
        self.op_token().map(|t| t.kind())
    }

    pub fn lhs(&self) -> Option<Expr> {
        nth_child(&self.0, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_child(&self.0, 1)
    }
}

impl UnaryExpr {
    pub fn op_token(&self) -> Option<SyntaxToken> {
        first_real_token(&self.0)
    }

    pub fn op(&self) -> Option<SyntaxKind> {
        self.op_token().map(|t| t.kind())
    }

    first_child_method!(operand, Expr);
}

impl TernaryExpr {
    pub fn cond(&self) -> Option<Expr> {
        nth_child(&self.0, 0)
    }

    pub fn then_expr(&self) -> Option<Expr> {
        nth_child(&self.0, 1)
    }

    pub fn else_expr(&self) -> Option<Expr> {
        nth_child(&self.0, 2)
    }
}

impl CastExpr {
    first_child_method!(operand, Expr);
    first_child_method!(ty, TypeNode);
}

impl IsExpr {
    first_child_method!(operand, Expr);
    first_child_method!(pattern, Pat);
}

impl SizeofExpr {
    first_child_method!(ty, TypeNode);
}

impl RecordExpr {
    token_method!(name_token, IDENT);
    children_method!(inits, FieldInit);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl FieldInit {
    token_method!(name_token, IDENT);
    first_child_method!(value, Expr);
    has_token_method!(has_colon, COLON);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }

    /// `P { x }` initializes field `x` from the name `x` in scope.
    pub fn is_shorthand(&self) -> bool {
        !self.has_colon()
    }
}
