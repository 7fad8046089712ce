use super::{type_mismatch_message, Diagnostic};
use crate::formula::{LocatedFormula, LocatedTerm};
use crate::span::SourceSpan;
use crate::types::TypeTree;
use std::collections::HashSet;

/// Warn on every term whose name is bound elsewhere in the document with an
/// incompatible type.
///
/// Terms are compared pairwise in document order; a span is reported at
/// most once however many terms it collides with.
pub fn type_mismatches(types: &TypeTree, formulas: &[LocatedFormula]) -> Vec<Diagnostic> {
    let terms: Vec<LocatedTerm<'_>> = formulas.iter().flat_map(|f| f.terms()).collect();
    let mut reported: HashSet<SourceSpan> = HashSet::new();
    let mut diagnostics = Vec::new();

    for (i, first) in terms.iter().enumerate() {
        for second in &terms[i + 1..] {
            if first.term.name != second.term.name
                || types.are_compatible_types(first.term.ty, second.term.ty)
            {
                continue;
            }
            let message =
                type_mismatch_message(types.name(first.term.ty), types.name(second.term.ty));
            for span in [first.span, second.span] {
                if reported.insert(span) {
                    diagnostics.push(Diagnostic::warning(span, message.clone()));
                }
            }
        }
    }

    tracing::debug!(terms = terms.len(), mismatches = diagnostics.len(), "type check done");
    diagnostics
}
