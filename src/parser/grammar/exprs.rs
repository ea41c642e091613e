//! Pratt expression parser.
//!
//! One binding-power loop handles every infix, postfix, cast, and ternary
//! form. Left operands are re-parented under the operator node through a
//! rowan checkpoint taken before the operand was parsed, which gives
//! left-recursive trees without lookahead tricks.
//!
//! Binding powers, lowest to highest:
//!
//! ```text
//!  1 assignment (right)    8 comparison       13 unary prefix
//!  2 ternary (right)       9 shift            14 postfix . ( [
//!  3 ||   4 &&            10 + -              15 primary
//!  5 |    6 ^    7 &      11 * / %
//!                         12 as / is
//! ```

use super::super::context::ParseContext;
use super::super::parser::Parser;
use super::super::syntax_kind::SyntaxKind;
use super::{patterns, types};

const ASSIGN_BP: u8 = 1;
const TERNARY_BP: u8 = 2;
const CAST_BP: u8 = 12;
const UNARY_BP: u8 = 13;
const POSTFIX_BP: u8 = 14;

/// Parse an expression, returning true if any tokens were consumed.
pub(crate) fn expr(p: &mut Parser<'_>) -> bool {
    p.push_context(ParseContext::Expression);
    let consumed = expr_bp(p, ASSIGN_BP);
    p.pop_context();
    consumed
}

/// Token kinds that can start an expression.
pub(super) fn can_start_expr(kind: SyntaxKind) -> bool {
    kind.is_literal_token()
        || matches!(
            kind,
            SyntaxKind::L_PAREN
                | SyntaxKind::L_BRACKET
                | SyntaxKind::IDENT
                | SyntaxKind::SIZEOF_KW
                | SyntaxKind::BANG
                | SyntaxKind::MINUS
                | SyntaxKind::TILDE
                | SyntaxKind::AMP
                | SyntaxKind::STAR
        )
}

/// Left and right binding powers of a binary operator.
fn binary_bp(kind: SyntaxKind) -> Option<(u8, u8)> {
    use SyntaxKind::*;
    let (lbp, rbp) = match kind {
        // Right-associative: rhs parsed at the same power.
        EQ | PIPE_EQ | AMP_EQ | CARET_EQ | SHL_EQ | SHR_EQ | PLUS_EQ | MINUS_EQ | STAR_EQ
        | SLASH_EQ | PERCENT_EQ => (ASSIGN_BP, ASSIGN_BP),
        PIPE_PIPE => (3, 4),
        AMP_AMP => (4, 5),
        PIPE => (5, 6),
        CARET => (6, 7),
        AMP => (7, 8),
        EQ_EQ | BANG_EQ | LT | LT_EQ | GT | GT_EQ => (8, 9),
        SHL | SHR => (9, 10),
        PLUS | MINUS => (10, 11),
        STAR | SLASH | PERCENT => (11, 12),
        _ => return None,
    };
    Some((lbp, rbp))
}

/// Parse an expression with operators binding at least `min_bp`.
pub(super) fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> bool {
    // Leading trivia goes to the enclosing node so a checkpoint-wrapped
    // operator node starts exactly at its left operand.
    p.eat_trivia();
    let cp = p.checkpoint();
    match p.current_kind() {
        SyntaxKind::BANG
        | SyntaxKind::MINUS
        | SyntaxKind::TILDE
        | SyntaxKind::AMP
        | SyntaxKind::STAR => {
            p.start_node(SyntaxKind::UNARY_EXPR);
            p.bump();
            expr_bp(p, UNARY_BP);
            p.finish_node();
        }
        _ => {
            if !primary(p) {
                return false;
            }
        }
    }

    loop {
        match p.current_kind() {
            SyntaxKind::DOT if POSTFIX_BP >= min_bp => {
                p.start_node_at(cp, SyntaxKind::FIELD_EXPR);
                p.bump();
                p.expect(SyntaxKind::IDENT);
                p.finish_node();
            }
            SyntaxKind::L_PAREN if POSTFIX_BP >= min_bp => {
                p.start_node_at(cp, SyntaxKind::CALL_EXPR);
                arg_list(p);
                p.finish_node();
            }
            SyntaxKind::L_BRACKET if POSTFIX_BP >= min_bp => {
                p.start_node_at(cp, SyntaxKind::INDEX_EXPR);
                p.bump();
                expr(p);
                p.expect(SyntaxKind::R_BRACKET);
                p.finish_node();
            }
            SyntaxKind::AS_KW if CAST_BP >= min_bp => {
                p.start_node_at(cp, SyntaxKind::CAST_EXPR);
                p.bump();
                types::type_ref(p);
                p.finish_node();
            }
            SyntaxKind::IS_KW if CAST_BP >= min_bp => {
                p.start_node_at(cp, SyntaxKind::IS_EXPR);
                p.bump();
                patterns::pattern(p);
                p.finish_node();
            }
            SyntaxKind::QUESTION if TERNARY_BP >= min_bp => {
                p.start_node_at(cp, SyntaxKind::TERNARY_EXPR);
                p.bump();
                expr_bp(p, ASSIGN_BP);
                p.expect(SyntaxKind::COLON);
                expr_bp(p, TERNARY_BP);
                p.finish_node();
            }
            kind => {
                let Some((lbp, rbp)) = binary_bp(kind) else {
                    break;
                };
                if lbp < min_bp {
                    break;
                }
                p.start_node_at(cp, SyntaxKind::BINARY_EXPR);
                p.bump();
                expr_bp(p, rbp);
                p.finish_node();
            }
        }
    }
    true
}

fn primary(p: &mut Parser<'_>) -> bool {
    match p.current_kind() {
        SyntaxKind::L_PAREN => {
            p.start_node(SyntaxKind::GROUP_EXPR);
            p.bump();
            expr(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        // `Name { ... }` needs the second lookahead token; a bare name does not.
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::L_BRACE => record_expr(p),
        SyntaxKind::IDENT => {
            p.start_node(SyntaxKind::NAME_EXPR);
            p.bump();
            p.finish_node();
        }
        kind if kind.is_literal_token() => {
            p.start_node(SyntaxKind::LITERAL_EXPR);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::L_BRACKET => {
            p.push_context(ParseContext::ArrayLiteral);
            p.start_node(SyntaxKind::ARRAY_EXPR);
            p.bump();
            while !p.at(SyntaxKind::R_BRACKET) && !p.at_eof() {
                if !expr(p) {
                    p.error_recover(
                        "expected expression",
                        &[SyntaxKind::R_BRACKET, SyntaxKind::COMMA, SyntaxKind::SEMICOLON],
                    );
                }
                if !p.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            p.expect(SyntaxKind::R_BRACKET);
            p.finish_node();
            p.pop_context();
        }
        SyntaxKind::SIZEOF_KW => {
            p.start_node(SyntaxKind::SIZEOF_EXPR);
            p.bump();
            p.expect(SyntaxKind::L_PAREN);
            types::type_ref(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        _ => {
            p.error("expected expression");
            return false;
        }
    }
    true
}

/// `Name { (IDENT (':' expr)? ','?)* }`
fn record_expr(p: &mut Parser<'_>) {
    p.push_context(ParseContext::RecordLiteral);
    p.start_node(SyntaxKind::RECORD_EXPR);
    p.bump(); // name
    p.expect(SyntaxKind::L_BRACE);
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        if p.at(SyntaxKind::IDENT) {
            p.start_node(SyntaxKind::FIELD_INIT);
            p.bump();
            if p.eat(SyntaxKind::COLON) {
                expr(p);
            }
            p.finish_node();
        } else {
            p.error_recover(
                "expected field initializer",
                &[SyntaxKind::R_BRACE, SyntaxKind::COMMA, SyntaxKind::SEMICOLON],
            );
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
    p.pop_context();
}

/// `'(' (arg (',' arg)*)? ')'` where arg is `IDENT ':' expr` or `expr`
fn arg_list(p: &mut Parser<'_>) {
    p.push_context(ParseContext::ArgumentList);
    p.bump(); // (
    while !p.at(SyntaxKind::R_PAREN) && !p.at_eof() {
        p.start_node(SyntaxKind::CALL_ARG);
        if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::COLON {
            p.bump(); // name
            p.bump(); // :
            expr(p);
        } else if !expr(p) {
            p.error_recover(
                "expected argument",
                &[SyntaxKind::R_PAREN, SyntaxKind::COMMA, SyntaxKind::SEMICOLON],
            );
        }
        p.finish_node();
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.pop_context();
}
