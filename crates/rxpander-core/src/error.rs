//! Error and warning types for template processing.
//!
//! Errors use a stable T-series code format:
//! - T001-T004: template structure errors (commands, blocks, versions)
//! - T005-T006: expansion errors (script evaluation, unresolved expressions)

use thiserror::Error;

/// Errors from template processing.
///
/// Every variant carries the source line number of the logical line that
/// triggered it plus enough of the offending text to locate the problem in
/// the template. All errors are fatal to the run: a failing document
/// produces no output.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// T001: Malformed command line (wrong delimiters, unknown verb,
    /// bad qualifier, wrong argument count, stray End, bad version number).
    #[error("T001: line {line}: {message}\n  {text}")]
    Syntax {
        line: usize,
        text: String,
        message: String,
    },

    /// T002: A command other than the matching End appeared inside a block.
    #[error("T002: line {line}: cannot nest commands: {verb} inside an open {active} block\n  {text}")]
    NestedBlock {
        line: usize,
        text: String,
        verb: String,
        active: String,
    },

    /// T003: End of input reached while a block is still open.
    #[error("T003: end of input while still inside the {verb} block opened on line {opened_at}")]
    UnterminatedBlock { verb: String, opened_at: usize },

    /// T004: Template declares a processor version newer than supported.
    #[error(
        "T004: line {line}: template declares version {declared}, processor supports {supported}"
    )]
    UnsupportedVersion {
        line: usize,
        declared: String,
        supported: String,
    },

    /// T005: The embedded script or expression evaluator raised at runtime.
    #[error("T005: line {line}: evaluation failed: {message}\n  {text}")]
    Evaluation {
        line: usize,
        text: String,
        message: String,
    },

    /// T006: A delimited expression survived full expansion (undefined
    /// variable or mistyped delimiter).
    #[error("T006: line {line}: unresolved expression '{expression}' after expansion\n  {text}")]
    UnresolvedExpression {
        line: usize,
        text: String,
        expression: String,
    },
}

impl TemplateError {
    /// Returns the error code (e.g., "T001").
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::Syntax { .. } => "T001",
            TemplateError::NestedBlock { .. } => "T002",
            TemplateError::UnterminatedBlock { .. } => "T003",
            TemplateError::UnsupportedVersion { .. } => "T004",
            TemplateError::Evaluation { .. } => "T005",
            TemplateError::UnresolvedExpression { .. } => "T006",
        }
    }

    /// Source line number the error is attached to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            TemplateError::Syntax { line, .. }
            | TemplateError::NestedBlock { line, .. }
            | TemplateError::UnsupportedVersion { line, .. }
            | TemplateError::Evaluation { line, .. }
            | TemplateError::UnresolvedExpression { line, .. } => Some(*line),
            TemplateError::UnterminatedBlock { .. } => None,
        }
    }
}

/// A non-fatal diagnostic generated during processing.
///
/// Warnings never alter control flow; the driver returns them alongside the
/// expanded text for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessWarning {
    /// Source line number the warning refers to.
    pub line: usize,
    /// Warning message.
    pub message: String,
}

impl ProcessWarning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
