//! Diagnostic rules over one document's schema and parsed statements.
//!
//! Every rule is a pure function returning the diagnostics it found; the
//! analysis pass decides which rules run.

pub mod misaligned_connectives;
pub mod type_mismatch;
pub mod unmatched_literal;

use crate::error::SchemaError;
use crate::span::{Position, SourceSpan};
use serde::Serialize;

pub use misaligned_connectives::{clause_has_misaligned_connectives, misaligned_connectives};
pub use type_mismatch::type_mismatches;
pub use unmatched_literal::unmatched_literals;

pub const LITERAL_HAS_NO_TEMPLATE: &str = "Literal has no template.";
pub const CLAUSE_HAS_MISALIGNED_CONNECTIVES: &str = "Clause has misaligned connectives.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: SourceSpan,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(span: SourceSpan, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }

    pub fn error(span: SourceSpan, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }
}

pub fn type_mismatch_message(first: &str, second: &str) -> String {
    format!("Type mismatch: '{}' versus '{}'", first, second)
}

/// A failed schema build, reported against the whole document.
///
/// The diagnostic sits on the offending declaration when its span is known,
/// otherwise at the start of the document.
pub fn schema_error(err: &SchemaError) -> Diagnostic {
    let origin = Position::default();
    let span = err.span().unwrap_or(SourceSpan::new(origin, origin));
    Diagnostic::error(span, err.to_string())
}
