//! One full analysis pass over a document.
//!
//! The pass is a pure function of the document text and the settings:
//! directive detection on the raw text, comment stripping, segmentation,
//! schema build, the diagnostic rules and token derivation.

use crate::config::AnalysisConfig;
use crate::directive::{control_comments, type_checking_enabled};
use crate::document::{segment, strip_comments, DocumentSegments};
use crate::formula::LocatedFormula;
use crate::highlight::{control_comment_tokens, derive_tokens, SemanticToken};
use crate::rules::{
    misaligned_connectives, schema_error, type_mismatches, unmatched_literals, Diagnostic,
};
use crate::schema::Schema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub tokens: Vec<SemanticToken>,
}

pub fn analyze(text: &str, config: &AnalysisConfig) -> Analysis {
    let stripped = strip_comments(text);
    let segments = segment(&stripped);
    analyze_segments(text, &segments, config)
}

/// Analyze already segmented fragments. `raw` is the unstripped text, read
/// only for control comments.
pub fn analyze_segments(raw: &str, segments: &DocumentSegments, config: &AnalysisConfig) -> Analysis {
    let comments = control_comments(raw);
    let mut diagnostics = Vec::new();

    let tokens = match Schema::build(&segments.templates, &segments.type_declarations) {
        Ok(schema) => {
            let formulas = located_formulas(&schema, segments);
            diagnostics.extend(unmatched_literals(&schema, &segments.literals));
            diagnostics.extend(misaligned_connectives(&segments.clauses));
            if type_checking_enabled(raw) {
                diagnostics.extend(type_mismatches(schema.types(), &formulas));
            }
            derive_tokens(&comments, &formulas)
        }
        Err(err) => {
            tracing::warn!(error = %err, "schema build failed");
            diagnostics.push(schema_error(&err));
            diagnostics.extend(misaligned_connectives(&segments.clauses));
            control_comment_tokens(&comments)
        }
    };

    if diagnostics.len() > config.max_number_of_problems {
        tracing::debug!(
            found = diagnostics.len(),
            limit = config.max_number_of_problems,
            "truncating diagnostics"
        );
        diagnostics.truncate(config.max_number_of_problems);
    }
    Analysis { diagnostics, tokens }
}

pub fn diagnostics(text: &str, config: &AnalysisConfig) -> Vec<Diagnostic> {
    analyze(text, config).diagnostics
}

pub fn semantic_tokens(text: &str) -> Vec<SemanticToken> {
    analyze(text, &AnalysisConfig::default()).tokens
}

/// Every literal that matches a template, paired with where it came from.
fn located_formulas(schema: &Schema, segments: &DocumentSegments) -> Vec<LocatedFormula> {
    segments
        .literals
        .iter()
        .filter_map(|literal| {
            let formula = schema.match_literal(&literal.content)?;
            Some(LocatedFormula {
                segment: literal.clone(),
                formula,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Severity, LITERAL_HAS_NO_TEMPLATE};
    use crate::document::DocumentSegments;
    use crate::span::{Position, Segment, SourceSpan};

    const LIKES: &str = "\
the templates are:
*a person* really likes *an object* with value *a value*.

scenario one is:
bob spence really likes plates with value 5.
roses are red violets are blue.
";

    #[test]
    fn unmatched_statement_is_reported() {
        let analysis = analyze(LIKES, &AnalysisConfig::default());
        assert_eq!(analysis.diagnostics.len(), 1);
        let diag = &analysis.diagnostics[0];
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, LITERAL_HAS_NO_TEMPLATE);
        assert_eq!(diag.span.start, Position::new(5, 0));
    }

    #[test]
    fn matched_statement_yields_variable_tokens() {
        let tokens = semantic_tokens(LIKES);
        let spans: Vec<(u32, u32, u32)> =
            tokens.iter().map(|t| (t.line, t.character, t.length)).collect();
        assert_eq!(spans, vec![(4, 0, 10), (4, 24, 6), (4, 42, 1)]);
    }

    #[test]
    fn diagnostics_are_truncated() {
        let text = "\
the templates are:
*a person* is happy.

scenario one is:
x y z.
p q r.
s t u.
";
        let config = AnalysisConfig {
            max_number_of_problems: 2,
        };
        assert_eq!(diagnostics(text, &config).len(), 2);
        assert_eq!(diagnostics(text, &AnalysisConfig::default()).len(), 3);
    }

    #[test]
    fn schema_failure_is_one_error_and_skips_matching() {
        let text = "\
%type checking on
the templates are:
*a person is happy.

scenario one is:
nothing matches here.
";
        let analysis = analyze(text, &AnalysisConfig::default());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].severity, Severity::Error);
        assert_eq!(analysis.diagnostics[0].span.start, Position::new(2, 0));
        assert_eq!(analysis.tokens.len(), 1);
        assert_eq!(analysis.tokens[0].token_type, 3);
    }

    #[test]
    fn analysis_is_idempotent() {
        let config = AnalysisConfig::default();
        assert_eq!(analyze(LIKES, &config), analyze(LIKES, &config));
    }

    #[test]
    fn caller_built_segments_drive_the_rules() {
        let template = "*a person* really likes *an object* with value *a value*";
        let statements = [
            "bob spence really likes plates with value 5",
            "roses are red violets are blue",
        ];
        let segments = DocumentSegments {
            templates: vec![Segment::new(
                template,
                SourceSpan::covering(Position::new(1, 0), template),
            )],
            type_declarations: Vec::new(),
            clauses: Segment::locate_all(LIKES, &statements),
            // The second literal had its whitespace normalized and is not in the text.
            literals: Segment::locate_all(
                LIKES,
                &["bob spence really likes plates with value 5", "roses  are red violets are blue"],
            ),
        };
        assert_eq!(segments.clauses.len(), 2);
        assert_eq!(segments.literals.len(), 1);

        let analysis = analyze_segments(LIKES, &segments, &AnalysisConfig::default());
        assert!(analysis.diagnostics.is_empty());
        let spans: Vec<(u32, u32, u32)> =
            analysis.tokens.iter().map(|t| (t.line, t.character, t.length)).collect();
        assert_eq!(spans, vec![(4, 0, 10), (4, 24, 6), (4, 42, 1)]);

        // The same literal located by the caller is reported where it sits.
        let located = DocumentSegments {
            literals: Segment::locate_all(LIKES, &statements),
            ..segments
        };
        let analysis = analyze_segments(LIKES, &located, &AnalysisConfig::default());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].message, LITERAL_HAS_NO_TEMPLATE);
        assert_eq!(analysis.diagnostics[0].span.start, Position::new(5, 0));
    }
}
