//! Typed views of match patterns.

use rowan::NodeOrToken;
use smol_str::SmolStr;

use super::items::token_text;
use super::{AstNode, Expr, ast_enum, ast_node, children_method, first_child_method, token_method};
use crate::parser::SyntaxKind;

ast_node!(GroupPat, GROUP_PAT);
ast_node!(LiteralPat, LITERAL_PAT);
ast_node!(NamePat, NAME_PAT);
ast_node!(WildcardPat, WILDCARD_PAT);
ast_node!(VarPat, VAR_PAT);
ast_node!(RangePat, RANGE_PAT);
ast_node!(OrPat, OR_PAT);

ast_enum!(
    /// Any pattern.
    Pat {
        Group(GroupPat),
        Literal(LiteralPat),
        Name(NamePat),
        Wildcard(WildcardPat),
        Var(VarPat),
        Range(RangePat),
        Or(OrPat),
    }
);

impl GroupPat {
    first_child_method!(inner, Pat);
}

impl LiteralPat {
    first_child_method!(expr, Expr);
}

impl NamePat {
    first_child_method!(expr, Expr);
}

impl VarPat {
    token_method!(name_token, IDENT);
    first_child_method!(inner, Pat);

    pub fn name(&self) -> SmolStr {
        token_text(self.name_token().as_ref())
    }
}

impl RangePat {
    /// Bound expressions on either side of the `...` token.
    pub fn bounds(&self) -> (Option<Expr>, Option<Expr>) {
        let mut lower = None;
        let mut upper = None;
        let mut seen_dots = false;
        for child in self.0.children_with_tokens() {
            match child {
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::DOT_DOT_DOT => seen_dots = true,
                NodeOrToken::Node(node) => {
                    if let Some(expr) = Expr::cast(node) {
                        if seen_dots {
                            upper.get_or_insert(expr);
                        } else {
                            lower.get_or_insert(expr);
                        }
                    }
                }
                _ => {}
            }
        }
        (lower, upper)
    }

    pub fn lower(&self) -> Option<Expr> {
        self.bounds().0
    }

    pub fn upper(&self) -> Option<Expr> {
        self.bounds().1
    }

    /// A range with no bounds matches everything.
    pub fn is_unbounded(&self) -> bool {
        let (lower, upper) = self.bounds();
        lower.is_none() && upper.is_none()
    }
}

impl OrPat {
    children_method!(alternatives, Pat);
}
