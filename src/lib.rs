//! # bittle-core
//!
//! Core library for Bittle parsing, elaboration, and editor queries.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → query façade consumed by editor integrations
//!   ↓
//! semantic  → types, symbols, constant evaluation, elaborator, control flow
//!   ↓
//! project   → virtual filesystem, path resolution, file graph
//!   ↓
//! parser    → Logos lexer, recursive-descent + Pratt parser, typed AST
//!   ↓
//! core      → reactive dependency cache
//!   ↓
//! base      → primitives (Point, Range, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → core → parser → project → semantic → ide)
// ============================================================================

/// Foundation types: Point, Range, LineIndex
pub mod base;

/// Reactive dependency cache
pub mod core;

/// Parser: Logos lexer, recursive-descent parser, typed AST views
pub mod parser;

/// Project management: virtual filesystem, path resolution, file graph
pub mod project;

/// Semantic analysis: type model, symbols, elaborator, control flow
pub mod semantic;

/// Editor queries: diagnostics, symbols in scope, resolve, types, references
pub mod ide;

// Re-export foundation types
pub use base::{LineIndex, Point, Range};
pub use ide::AnalysisHost;
pub use semantic::{Diagnostic, Severity};
