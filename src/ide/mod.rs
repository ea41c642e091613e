//! Editor-facing queries.
//!
//! Everything here is a pure projection over cached analysis results;
//! operations return data and never fail (problems surface as diagnostics).

mod analysis;

pub use analysis::{AnalysisHost, DocumentSymbol, Reference, ScopedSymbol};
