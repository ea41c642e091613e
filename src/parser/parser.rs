//! Recursive descent parser for Bittle
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST: every token of the
//! source, trivia included, appears in the tree exactly once. Trivia is
//! attached lazily, just before the next real token is consumed.

use super::context::ParseContext;
use super::grammar;
use super::lexer::{Token, tokenize};
use super::syntax_kind::{SyntaxKind, kind_to_name};
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse Bittle source code into a CST
pub fn parse(input: &str) -> Parse {
    let (tokens, lex_errors) = tokenize(input);
    let mut parser = Parser::new(&tokens);
    grammar::root(&mut parser);
    let mut parse = parser.finish();
    let mut errors: Vec<SyntaxError> = lex_errors
        .iter()
        .map(|e| SyntaxError::new(e.kind.to_string(), e.range))
        .collect();
    errors.append(&mut parse.errors);
    parse.errors = errors;
    parse
}

/// Tokens at which error recovery stops consuming by default: the start of
/// the next top-level declaration or a brace boundary.
pub(super) const DEFAULT_RECOVERY: &[SyntaxKind] = &[
    SyntaxKind::INCLUDE_KW,
    SyntaxKind::MODULE_KW,
    SyntaxKind::IMPORT_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::STRUCT_KW,
    SyntaxKind::UNION_KW,
    SyntaxKind::FUNC_KW,
    SyntaxKind::EXTERN_KW,
    SyntaxKind::L_BRACE,
    SyntaxKind::R_BRACE,
];

/// The parser state
pub(super) struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Offset of the most recent error, used to suppress cascades.
    last_error: Option<TextSize>,
    /// Enclosing constructs, innermost last.
    contexts: Vec<ParseContext>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            last_error: None,
            contexts: Vec::new(),
        }
    }

    pub(super) fn push_context(&mut self, context: ParseContext) {
        self.contexts.push(context);
    }

    pub(super) fn pop_context(&mut self) {
        self.contexts.pop();
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection (lookahead skips trivia without consuming it)
    // =========================================================================

    fn non_trivia_index(&self, n: usize) -> usize {
        let mut idx = self.pos;
        let mut remaining = n;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if remaining == 0 {
                    return idx;
                }
                remaining -= 1;
            }
            idx += 1;
        }
        self.tokens.len().saturating_sub(1)
    }

    pub(super) fn current(&self) -> &Token<'a> {
        &self.tokens[self.non_trivia_index(0)]
    }

    pub(super) fn current_kind(&self) -> SyntaxKind {
        self.current().kind
    }

    pub(super) fn current_text(&self) -> &'a str {
        self.current().text
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    pub(super) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    pub(super) fn at_eof(&self) -> bool {
        self.current_kind() == SyntaxKind::EOF
    }

    /// Token index, used by list loops to guarantee progress.
    pub(super) fn position(&self) -> usize {
        self.pos
    }

    /// Consume one stray token into an error node; the backstop for loops
    /// whose body made no progress.
    pub(super) fn bump_error(&mut self) {
        if !self.at_eof() {
            self.start_node(SyntaxKind::ERROR);
            self.bump();
            self.finish_node();
        }
    }

    /// Kind of the nth non-trivia token ahead (0 = current).
    pub(super) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens[self.non_trivia_index(n)].kind
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Attach pending trivia tokens at the current tree position.
    pub(super) fn eat_trivia(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind.is_trivia())
        {
            let token = &self.tokens[self.pos];
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    /// Consume the current non-trivia token (with its leading trivia).
    pub(super) fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            if token.kind != SyntaxKind::EOF {
                self.builder.token(token.kind.into(), token.text);
                self.pos += 1;
            }
        }
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            let expected = kind_to_name(kind);
            let found = kind_to_name(self.current_kind());
            let context = match self.contexts.last() {
                Some(context) => format!(" while parsing {}", context.description()),
                None => String::new(),
            };
            self.error(format!("expected {expected}, found {found}{context}"));
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    pub(super) fn error(&mut self, message: impl Into<String>) {
        let token = self.current();
        let range = token.range();
        // One diagnostic per source point keeps a single bad token from
        // producing a cascade.
        if self.last_error == Some(range.start()) {
            return;
        }
        self.last_error = Some(range.start());
        self.errors.push(SyntaxError::new(message, range));
    }

    pub(super) fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        if self.at_eof() || self.at_any(recovery) {
            return;
        }
        self.start_node(SyntaxKind::ERROR);
        // Always consume at least one token to make progress.
        self.bump();
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    /// Open a node at the next real token: pending trivia is attached to
    /// the still-open parent first, so every node's range starts at its
    /// first non-trivia token. The root has no parent to take the trivia.
    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        if kind != SyntaxKind::ROOT {
            self.eat_trivia();
        }
        self.builder.start_node(kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Record a position so that already-parsed children can later be
    /// re-parented under an infix/postfix node.
    pub(super) fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxNode;

    fn roundtrip(input: &str) {
        let parse = parse(input);
        let root = SyntaxNode::new_root(parse.green.clone());
        assert_eq!(root.text().to_string(), input, "lossless roundtrip");
    }

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert!(result.ok());
        assert_eq!(result.syntax().kind(), SyntaxKind::ROOT);
    }

    #[test]
    fn test_parse_simple_func() {
        let result = parse("func main(): Int32 { return 0; }");
        assert!(result.ok(), "errors: {:?}", result.errors);
        roundtrip("func main(): Int32 { return 0; }");
    }

    #[test]
    fn test_parse_struct() {
        let result = parse("struct Point { x: Int, y: Int }");
        assert!(result.ok(), "errors: {:?}", result.errors);
    }

    #[test]
    fn test_roundtrip_with_trivia() {
        roundtrip("// header\nfunc f() {\n    // body\n    return;\n}\n");
        roundtrip("  \n\n  var x: Int32;   // trailing\n");
    }

    #[test]
    fn test_error_recovery_keeps_going() {
        let result = parse("func f( {} func g() {}");
        assert!(!result.ok());
        // Both functions still show up in the tree.
        let funcs = result
            .syntax()
            .children()
            .filter(|n| n.kind() == SyntaxKind::FUNC_DECL)
            .count();
        assert_eq!(funcs, 2);
    }

    #[test]
    fn test_garbage_terminates() {
        let result = parse(")))) ;;;; ????");
        assert!(!result.ok());
        roundtrip(")))) ;;;; ????");
    }

    #[test]
    fn test_duplicate_errors_suppressed() {
        let result = parse("func f(: :) {}");
        let first = result.errors.first().map(|e| e.range.start());
        let dupes = result
            .errors
            .iter()
            .filter(|e| Some(e.range.start()) == first)
            .count();
        assert_eq!(dupes, 1);
    }
}
