//! Grammar productions for Bittle
//!
//! Split by construct family: declarations (`items`), type references
//! (`types`), statements (`stmts`), expressions (`exprs`, a Pratt parser),
//! and patterns (`patterns`). Every production is a free function over the
//! shared [`Parser`](super::parser::Parser) state.

mod exprs;
mod items;
mod patterns;
mod stmts;
mod types;

use super::parser::Parser;
use super::syntax_kind::SyntaxKind;

/// Parse a whole source file into a `ROOT` node.
pub(super) fn root(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::ROOT);
    while !p.at_eof() {
        let before = p.position();
        items::item(p);
        if p.position() == before {
            p.bump_error();
        }
    }
    // File-trailing trivia belongs to the root.
    p.eat_trivia();
    p.finish_node();
}
