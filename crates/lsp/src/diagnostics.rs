//! Analysis-to-diagnostic conversion.
//!
//! Runs `le_core::analyze()` on the editor's copy of a document and
//! converts every core diagnostic into an `lsp_types::Diagnostic`.

use le_core::{AnalysisConfig, Severity};
use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

/// Source label shown next to every diagnostic in the editor.
pub const SOURCE: &str = "logical-english";

/// Analyze `content` and return its diagnostics, truncated per `config`.
pub fn compute_diagnostics(content: &str, config: &AnalysisConfig) -> Vec<Diagnostic> {
    le_core::diagnostics(content, config)
        .iter()
        .map(to_lsp_diagnostic)
        .collect()
}

pub fn to_lsp_diagnostic(diag: &le_core::Diagnostic) -> Diagnostic {
    let severity = match diag.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };
    Diagnostic {
        range: to_lsp_range(diag.span),
        severity: Some(severity),
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

pub fn to_lsp_range(span: le_core::SourceSpan) -> Range {
    Range::new(
        Position::new(span.start.line, span.start.character),
        Position::new(span.end.line, span.end.character),
    )
}
