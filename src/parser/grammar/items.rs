//! Top-level declarations.
//!
//! Every declaration starts with a keyword; `extern` introduces either a
//! function or a global. Anything else becomes an error node that consumes
//! up to the next declaration keyword.

use super::super::context::ParseContext;
use super::super::parser::{DEFAULT_RECOVERY, Parser};
use super::super::syntax_kind::SyntaxKind;
use super::{exprs, types};

pub(super) fn item(p: &mut Parser<'_>) {
    match p.current_kind() {
        SyntaxKind::INCLUDE_KW => path_decl(p, SyntaxKind::INCLUDE_DECL),
        SyntaxKind::IMPORT_KW => path_decl(p, SyntaxKind::IMPORT_DECL),
        SyntaxKind::MODULE_KW => module_decl(p),
        SyntaxKind::ENUM_KW => enum_decl(p),
        SyntaxKind::STRUCT_KW | SyntaxKind::UNION_KW => record_decl(p),
        SyntaxKind::FUNC_KW => func_decl(p),
        SyntaxKind::VAR_KW => global_decl(p),
        SyntaxKind::CONST_KW => const_decl(p),
        SyntaxKind::EXTERN_KW => match p.nth(1) {
            SyntaxKind::FUNC_KW => func_decl(p),
            SyntaxKind::VAR_KW => global_decl(p),
            _ => {
                p.error_recover(
                    "expected 'func' or 'var' after 'extern'",
                    DEFAULT_RECOVERY,
                );
            }
        },
        _ => {
            p.error_recover("unexpected start of declaration", DEFAULT_RECOVERY);
        }
    }
}

/// `include STRING ;` and `import STRING ;`
fn path_decl(p: &mut Parser<'_>, kind: SyntaxKind) {
    let context = if kind == SyntaxKind::INCLUDE_DECL {
        ParseContext::IncludeDecl
    } else {
        ParseContext::ImportDecl
    };
    p.push_context(context);
    p.start_node(kind);
    p.bump();
    p.expect(SyntaxKind::STRING);
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node();
    p.pop_context();
}

/// `module IDENT ;`
fn module_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::ModuleDecl);
    p.start_node(SyntaxKind::MODULE_DECL);
    p.bump();
    p.expect(SyntaxKind::IDENT);
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node();
    p.pop_context();
}

/// `enum IDENT? { (IDENT ('=' expr)? ','?)* }`
fn enum_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::EnumDecl);
    p.start_node(SyntaxKind::ENUM_DECL);
    p.bump();
    p.eat(SyntaxKind::IDENT);
    if p.expect(SyntaxKind::L_BRACE) {
        while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
            if p.at(SyntaxKind::IDENT) {
                p.start_node(SyntaxKind::ENUM_MEMBER);
                p.bump();
                if p.eat(SyntaxKind::EQ) {
                    exprs::expr(p);
                }
                p.finish_node();
                p.eat(SyntaxKind::COMMA);
            } else {
                p.error_recover("expected enum member", DEFAULT_RECOVERY);
                if p.at_any(DEFAULT_RECOVERY) && !p.at(SyntaxKind::R_BRACE) {
                    break;
                }
            }
        }
        p.expect(SyntaxKind::R_BRACE);
    }
    p.finish_node();
    p.pop_context();
}

/// `('struct'|'union') IDENT (':' type)? { (IDENT (':' type)? ('=' expr)? ','?)* }`
fn record_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::RecordDecl);
    p.start_node(SyntaxKind::RECORD_DECL);
    p.bump();
    p.expect(SyntaxKind::IDENT);
    if p.eat(SyntaxKind::COLON) {
        types::type_ref(p);
    }
    if p.expect(SyntaxKind::L_BRACE) {
        while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
            if p.at(SyntaxKind::IDENT) {
                p.start_node(SyntaxKind::RECORD_FIELD);
                p.bump();
                if p.eat(SyntaxKind::COLON) {
                    types::type_ref(p);
                }
                if p.eat(SyntaxKind::EQ) {
                    exprs::expr(p);
                }
                p.finish_node();
                p.eat(SyntaxKind::COMMA);
            } else {
                p.error_recover("expected record field", DEFAULT_RECOVERY);
                if p.at_any(DEFAULT_RECOVERY) && !p.at(SyntaxKind::R_BRACE) {
                    break;
                }
            }
        }
        p.expect(SyntaxKind::R_BRACE);
    }
    p.finish_node();
    p.pop_context();
}

/// `'extern'? func IDENT '(' params ')' (':' type)? (block | ';')`
fn func_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::FuncDecl);
    p.start_node(SyntaxKind::FUNC_DECL);
    p.eat(SyntaxKind::EXTERN_KW);
    p.bump(); // func
    p.expect(SyntaxKind::IDENT);
    if p.expect(SyntaxKind::L_PAREN) {
        param_list(p);
        p.expect(SyntaxKind::R_PAREN);
    }
    if p.eat(SyntaxKind::COLON) {
        types::type_ref(p);
    }
    if p.at(SyntaxKind::L_BRACE) {
        super::stmts::block(p);
    } else {
        p.expect(SyntaxKind::SEMICOLON);
    }
    p.finish_node();
    p.pop_context();
}

fn param_list(p: &mut Parser<'_>) {
    p.push_context(ParseContext::ParamList);
    while !p.at(SyntaxKind::R_PAREN) && !p.at_eof() {
        match p.current_kind() {
            SyntaxKind::IDENT => {
                p.start_node(SyntaxKind::PARAM);
                p.bump();
                if p.expect(SyntaxKind::COLON) {
                    types::type_ref(p);
                }
                if p.eat(SyntaxKind::EQ) {
                    exprs::expr(p);
                }
                p.finish_node();
            }
            // `...` without a name: an anonymous variadic tail.
            SyntaxKind::DOT_DOT_DOT => {
                p.start_node(SyntaxKind::PARAM);
                types::type_ref(p);
                p.finish_node();
            }
            _ => {
                p.error_recover(
                    "expected parameter",
                    &[SyntaxKind::R_PAREN, SyntaxKind::COMMA, SyntaxKind::L_BRACE],
                );
                if !p.at(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.pop_context();
}

/// `'extern'? var IDENT ':' type ';'`
fn global_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::GlobalDecl);
    p.start_node(SyntaxKind::GLOBAL_DECL);
    p.eat(SyntaxKind::EXTERN_KW);
    p.bump(); // var
    p.expect(SyntaxKind::IDENT);
    if p.expect(SyntaxKind::COLON) {
        types::type_ref(p);
    }
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node();
    p.pop_context();
}

/// `const IDENT (':' type)? '=' expr ';'`
fn const_decl(p: &mut Parser<'_>) {
    p.push_context(ParseContext::ConstDecl);
    p.start_node(SyntaxKind::CONST_DECL);
    p.bump();
    p.expect(SyntaxKind::IDENT);
    if p.eat(SyntaxKind::COLON) {
        types::type_ref(p);
    }
    if p.expect(SyntaxKind::EQ) {
        exprs::expr(p);
    }
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node();
    p.pop_context();
}
