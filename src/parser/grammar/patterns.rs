//! Match patterns.
//!
//! `|` alternation sits at the top; range bounds are constant expressions
//! parsed above the bit-or level so the alternation bar is never swallowed
//! by the expression grammar.

use super::super::context::ParseContext;
use super::super::parser::Parser;
use super::super::syntax_kind::SyntaxKind;
use super::exprs;

/// Bounds and literal patterns parse as expressions, but above `|` (5).
const BOUND_BP: u8 = 6;

pub(crate) fn pattern(p: &mut Parser<'_>) {
    p.push_context(ParseContext::Pattern);
    p.eat_trivia();
    let cp = p.checkpoint();
    atom_pattern(p);
    if p.at(SyntaxKind::PIPE) {
        p.start_node_at(cp, SyntaxKind::OR_PAT);
        while p.eat(SyntaxKind::PIPE) {
            atom_pattern(p);
        }
        p.finish_node();
    }
    p.pop_context();
}

fn atom_pattern(p: &mut Parser<'_>) {
    p.eat_trivia();
    match p.current_kind() {
        SyntaxKind::UNDERSCORE => {
            p.start_node(SyntaxKind::WILDCARD_PAT);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::L_PAREN => {
            p.start_node(SyntaxKind::GROUP_PAT);
            p.bump();
            pattern(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        // `... hi` and the unbounded `...`
        SyntaxKind::DOT_DOT_DOT => {
            p.start_node(SyntaxKind::RANGE_PAT);
            p.bump();
            if exprs::can_start_expr(p.current_kind()) {
                exprs::expr_bp(p, BOUND_BP);
            }
            p.finish_node();
        }
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::AT => {
            p.start_node(SyntaxKind::VAR_PAT);
            p.bump(); // name
            p.bump(); // @
            atom_pattern(p);
            p.finish_node();
        }
        kind => {
            let first_is_name = kind == SyntaxKind::IDENT;
            let cp = p.checkpoint();
            if !exprs::expr_bp(p, BOUND_BP) {
                p.error_recover(
                    "expected pattern",
                    &[
                        SyntaxKind::COLON,
                        SyntaxKind::PIPE,
                        SyntaxKind::CASE_KW,
                        SyntaxKind::R_BRACE,
                    ],
                );
                return;
            }
            if p.at(SyntaxKind::DOT_DOT_DOT) {
                p.start_node_at(cp, SyntaxKind::RANGE_PAT);
                p.bump();
                if exprs::can_start_expr(p.current_kind()) {
                    exprs::expr_bp(p, BOUND_BP);
                }
                p.finish_node();
            } else if first_is_name {
                p.start_node_at(cp, SyntaxKind::NAME_PAT);
                p.finish_node();
            } else {
                p.start_node_at(cp, SyntaxKind::LITERAL_PAT);
                p.finish_node();
            }
        }
    }
}
