//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a `SyntaxNode` of one kind and exposes accessors for
//! its children. The wrappers are pure projections: nothing here allocates
//! or mutates, and a wrapper is always backed by a live node.

mod exprs;
mod items;
mod pats;
mod stmts;
mod types;

pub use exprs::*;
pub use items::*;
pub use pats::*;
pub use stmts::*;
pub use types::*;

use super::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};
use rowan::TextRange;

/// A typed view of one syntax node kind.
pub trait AstNode: Sized {
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    fn range(&self) -> TextRange {
        self.syntax().text_range()
    }
}

/// Find the first direct child token of the specified kind.
pub(crate) fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Check if a syntax node has a direct child token of the specified kind.
pub(crate) fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    child_token(node, kind).is_some()
}

/// Find the first direct child token that is not trivia.
pub(crate) fn first_real_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| !t.kind().is_trivia())
}

/// Get the nth direct child castable to the given AST type.
pub(crate) fn nth_child<T: AstNode>(node: &SyntaxNode, n: usize) -> Option<T> {
    node.children().filter_map(T::cast).nth(n)
}

/// Declare a typed wrapper for one composite node kind.
macro_rules! ast_node {
    ($(#[$attr:meta])* $name:ident, $kind:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) crate::parser::SyntaxNode);

        impl crate::parser::ast::AstNode for $name {
            fn cast(node: crate::parser::SyntaxNode) -> Option<Self> {
                (node.kind() == crate::parser::SyntaxKind::$kind).then(|| Self(node))
            }
            fn syntax(&self) -> &crate::parser::SyntaxNode {
                &self.0
            }
        }
    };
}

/// Generate a method returning the first child of a given AST type.
macro_rules! first_child_method {
    ($name:ident, $ty:ident) => {
        #[doc = concat!("Get the first `", stringify!($ty), "` child of this node.")]
        pub fn $name(&self) -> Option<$ty> {
            self.0.children().find_map($ty::cast)
        }
    };
}

/// Generate a method returning an iterator over children of a given AST type.
macro_rules! children_method {
    ($name:ident, $ty:ident) => {
        #[doc = concat!("Get all `", stringify!($ty), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $ty> + '_ {
            self.0.children().filter_map($ty::cast)
        }
    };
}

/// Generate a method returning the first direct token of a given kind.
macro_rules! token_method {
    ($name:ident, $kind:ident) => {
        #[doc = concat!("Get the `", stringify!($kind), "` token of this node.")]
        pub fn $name(&self) -> Option<crate::parser::SyntaxToken> {
            crate::parser::ast::child_token(&self.0, crate::parser::SyntaxKind::$kind)
        }
    };
}

/// Generate a boolean method checking for a direct token of a given kind.
macro_rules! has_token_method {
    ($name:ident, $kind:ident) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token.")]
        pub fn $name(&self) -> bool {
            crate::parser::ast::has_token(&self.0, crate::parser::SyntaxKind::$kind)
        }
    };
}

/// Declare an enum dispatching over several node wrappers.
macro_rules! ast_enum {
    ($(#[$attr:meta])* $name:ident { $($variant:ident($ty:ident)),* $(,)? }) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant($ty),)*
        }

        impl crate::parser::ast::AstNode for $name {
            fn cast(node: crate::parser::SyntaxNode) -> Option<Self> {
                $(
                    if let Some(n) = $ty::cast(node.clone()) {
                        return Some(Self::$variant(n));
                    }
                )*
                None
            }
            fn syntax(&self) -> &crate::parser::SyntaxNode {
                match self {
                    $(Self::$variant(n) => n.syntax(),)*
                }
            }
        }
    };
}

pub(crate) use {ast_enum, ast_node, children_method, first_child_method, has_token_method, token_method};
