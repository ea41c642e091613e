//! Statements.

use super::super::context::ParseContext;
use super::super::parser::Parser;
use super::super::syntax_kind::SyntaxKind;
use super::{exprs, patterns, types};

const STMT_RECOVERY: &[SyntaxKind] = &[
    SyntaxKind::SEMICOLON,
    SyntaxKind::L_BRACE,
    SyntaxKind::R_BRACE,
    SyntaxKind::CASE_KW,
    SyntaxKind::VAR_KW,
    SyntaxKind::IF_KW,
    SyntaxKind::MATCH_KW,
    SyntaxKind::WHILE_KW,
    SyntaxKind::FOR_KW,
    SyntaxKind::RETURN_KW,
    SyntaxKind::BREAK_KW,
    SyntaxKind::CONTINUE_KW,
    SyntaxKind::FUNC_KW,
];

pub(super) fn block(p: &mut Parser<'_>) {
    p.push_context(ParseContext::Block);
    p.start_node(SyntaxKind::BLOCK_STMT);
    p.expect(SyntaxKind::L_BRACE);
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        let before = p.position();
        stmt(p);
        if p.position() == before {
            p.bump_error();
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
    p.pop_context();
}

pub(super) fn stmt(p: &mut Parser<'_>) {
    match p.current_kind() {
        SyntaxKind::L_BRACE => block(p),
        SyntaxKind::VAR_KW => local_decl(p),
        SyntaxKind::IF_KW => if_stmt(p),
        SyntaxKind::MATCH_KW => match_stmt(p),
        SyntaxKind::WHILE_KW => while_stmt(p),
        SyntaxKind::FOR_KW => for_stmt(p),
        SyntaxKind::RETURN_KW => {
            p.push_context(ParseContext::ReturnStmt);
            p.start_node(SyntaxKind::RETURN_STMT);
            p.bump();
            if !p.at(SyntaxKind::SEMICOLON) {
                exprs::expr(p);
            }
            p.expect(SyntaxKind::SEMICOLON);
            p.finish_node();
            p.pop_context();
        }
        SyntaxKind::BREAK_KW => {
            p.start_node(SyntaxKind::BREAK_STMT);
            p.bump();
            p.expect(SyntaxKind::SEMICOLON);
            p.finish_node();
        }
        SyntaxKind::CONTINUE_KW => {
            p.start_node(SyntaxKind::CONTINUE_STMT);
            p.bump();
            p.expect(SyntaxKind::SEMICOLON);
            p.finish_node();
        }
        _ => expr_stmt(p),
    }
}

/// `var IDENT (':' type)? ('=' expr)? ';'`
pub(super) fn local_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::LocalDecl);
    p.start_node(SyntaxKind::LOCAL_DECL);
    p.bump(); // var
    p.expect(SyntaxKind::IDENT);
    if p.eat(SyntaxKind::COLON) {
        types::type_ref(p);
    }
    if p.eat(SyntaxKind::EQ) {
        exprs::expr(p);
    }
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node();
    p.pop_context();
}

/// `if '(' expr ')' stmt ('else' stmt)?`
fn if_stmt(p: &mut Parser<'_>) {
    p.push_context(ParseContext::IfStmt);
    p.start_node(SyntaxKind::IF_STMT);
    p.bump();
    p.expect(SyntaxKind::L_PAREN);
    exprs::expr(p);
    p.expect(SyntaxKind::R_PAREN);
    stmt(p);
    if p.eat(SyntaxKind::ELSE_KW) {
        stmt(p);
    }
    p.finish_node();
    p.pop_context();
}

/// `while '(' expr ')' stmt`
fn while_stmt(p: &mut Parser<'_>) {
    p.push_context(ParseContext::WhileStmt);
    p.start_node(SyntaxKind::WHILE_STMT);
    p.bump();
    p.expect(SyntaxKind::L_PAREN);
    exprs::expr(p);
    p.expect(SyntaxKind::R_PAREN);
    stmt(p);
    p.finish_node();
    p.pop_context();
}

/// `for '(' init? ';' cond? ';' step? ')' stmt`
///
/// The init slot is a full statement (a `var` declaration or an expression
/// statement) carrying its own semicolon; an empty init leaves a bare `;`.
fn for_stmt(p: &mut Parser<'_>) {
    p.push_context(ParseContext::ForStmt);
    p.start_node(SyntaxKind::FOR_STMT);
    p.bump();
    p.expect(SyntaxKind::L_PAREN);
    if p.at(SyntaxKind::SEMICOLON) {
        p.bump();
    } else if p.at(SyntaxKind::VAR_KW) {
        local_decl(p);
    } else {
        expr_stmt(p);
    }
    if !p.at(SyntaxKind::SEMICOLON) && !p.at(SyntaxKind::R_PAREN) {
        exprs::expr(p);
    }
    p.expect(SyntaxKind::SEMICOLON);
    if !p.at(SyntaxKind::R_PAREN) {
        exprs::expr(p);
    }
    p.expect(SyntaxKind::R_PAREN);
    stmt(p);
    p.finish_node();
    p.pop_context();
}

/// `match '(' expr ')' '{' ('case' pattern guard? ':' stmt*)* '}'`
fn match_stmt(p: &mut Parser<'_>) {
    p.push_context(ParseContext::MatchStmt);
    p.start_node(SyntaxKind::MATCH_STMT);
    p.bump();
    p.expect(SyntaxKind::L_PAREN);
    exprs::expr(p);
    p.expect(SyntaxKind::R_PAREN);
    p.expect(SyntaxKind::L_BRACE);
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        if p.at(SyntaxKind::CASE_KW) {
            match_case(p);
        } else {
            p.error_recover(
                "expected 'case'",
                &[SyntaxKind::CASE_KW, SyntaxKind::R_BRACE],
            );
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
    p.pop_context();
}

fn match_case(p: &mut Parser<'_>) {
    p.push_context(ParseContext::MatchCase);
    p.start_node(SyntaxKind::MATCH_CASE);
    p.bump(); // case
    patterns::pattern(p);
    if p.at(SyntaxKind::IF_KW) {
        p.start_node(SyntaxKind::MATCH_GUARD);
        p.bump();
        p.expect(SyntaxKind::L_PAREN);
        exprs::expr(p);
        p.expect(SyntaxKind::R_PAREN);
        p.finish_node();
    }
    p.expect(SyntaxKind::COLON);
    while !p.at(SyntaxKind::CASE_KW) && !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        let before = p.position();
        stmt(p);
        if p.position() == before {
            p.bump_error();
        }
    }
    p.finish_node();
    p.pop_context();
}

fn expr_stmt(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::EXPR_STMT);
    if p.at(SyntaxKind::SEMICOLON) {
        // Empty statement.
        p.bump();
        p.finish_node();
        return;
    }
    if !exprs::expr(p) {
        p.error_recover("expected statement", STMT_RECOVERY);
        p.eat(SyntaxKind::SEMICOLON);
        p.finish_node();
        return;
    }
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node();
}
