//! Type references.
//!
//! Types are short: grouped, name, pointer `* mut? T`, array `[T; n]`,
//! `typeof(expr)`, never `!`, and the rest tail `...`.

use super::super::context::ParseContext;
use super::super::parser::{DEFAULT_RECOVERY, Parser};
use super::super::syntax_kind::SyntaxKind;
use super::exprs;

pub(crate) fn type_ref(p: &mut Parser<'_>) {
    p.push_context(ParseContext::TypeRef);
    type_ref_inner(p);
    p.pop_context();
}

fn type_ref_inner(p: &mut Parser<'_>) {
    match p.current_kind() {
        SyntaxKind::L_PAREN => {
            p.start_node(SyntaxKind::GROUP_TYPE);
            p.bump();
            type_ref_inner(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        SyntaxKind::IDENT => {
            p.start_node(SyntaxKind::NAME_TYPE);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::STAR => {
            p.start_node(SyntaxKind::POINTER_TYPE);
            p.bump();
            p.eat(SyntaxKind::MUT_KW);
            type_ref_inner(p);
            p.finish_node();
        }
        SyntaxKind::L_BRACKET => {
            p.start_node(SyntaxKind::ARRAY_TYPE);
            p.bump();
            type_ref_inner(p);
            if p.eat(SyntaxKind::SEMICOLON) {
                exprs::expr(p);
            }
            p.expect(SyntaxKind::R_BRACKET);
            p.finish_node();
        }
        SyntaxKind::TYPEOF_KW => {
            p.start_node(SyntaxKind::TYPEOF_TYPE);
            p.bump();
            p.expect(SyntaxKind::L_PAREN);
            exprs::expr(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        SyntaxKind::BANG => {
            p.start_node(SyntaxKind::NEVER_TYPE);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::DOT_DOT_DOT => {
            p.start_node(SyntaxKind::REST_TYPE);
            p.bump();
            p.finish_node();
        }
        _ => {
            p.error_recover("expected type", DEFAULT_RECOVERY);
        }
    }
}
