//! Foundation types for the Bittle toolchain.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`Point`], [`Range`] - Line/column positions for editor queries
//! - [`LineIndex`] - Byte-offset to line/column conversion
//!
//! This module has NO dependencies on other bittle modules.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::{Point, Range};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
