//! Diagnostic values accumulated by the analysis passes.
//!
//! The pipeline never aborts on user-visible errors; everything is collected
//! here and surfaced through the query façade.

use std::path::PathBuf;

use crate::base::Range;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A hard error in the source
    #[default]
    Error,
    /// A warning that doesn't prevent analysis
    Warning,
    /// Informational
    Info,
    /// An informational hint
    Hint,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Hint => "hint",
        }
    }
}

/// A diagnostic with severity, message, and source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    pub range: Range,
    /// Marks a region the editor may grey out (dead code).
    pub unnecessary: bool,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        file: impl Into<PathBuf>,
        range: Range,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            range,
            unnecessary: false,
        }
    }

    pub fn error(file: impl Into<PathBuf>, range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, file, range, message)
    }

    pub fn warning(file: impl Into<PathBuf>, range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, file, range, message)
    }

    pub fn hint(file: impl Into<PathBuf>, range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Hint, file, range, message)
    }

    pub fn with_unnecessary(mut self) -> Self {
        self.unnecessary = true;
        self
    }
}
