//! Rowan-based lossless parser for Bittle
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! We build a lossless CST that preserves all whitespace and comments, then
//! expose a typed AST layer on top.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! Elaborator → Semantic model
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod context;
mod grammar;
mod lexer;
mod syntax_kind;

pub use context::ParseContext;
pub use lexer::{LexError, LexErrorKind, Lexer, Token, literal_content, tokenize, unescape_lenient};
pub use parser::{Parse, SyntaxError, parse};
pub use syntax_kind::{
    BittleLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodePtr, SyntaxToken,
    kind_to_name,
};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
