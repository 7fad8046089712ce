use super::{Diagnostic, LITERAL_HAS_NO_TEMPLATE};
use crate::schema::Schema;
use crate::span::Segment;

/// One warning per literal that no template matches.
pub fn unmatched_literals(schema: &Schema, literals: &[Segment]) -> Vec<Diagnostic> {
    literals
        .iter()
        .filter(|literal| !schema.matches_formula(&literal.content))
        .map(|literal| Diagnostic::warning(literal.span, LITERAL_HAS_NO_TEMPLATE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Position, SourceSpan};

    fn literal(content: &str, line: u32) -> Segment {
        Segment::new(content, SourceSpan::covering(Position::new(line, 0), content))
    }

    #[test]
    fn reports_each_unmatched_literal_once() {
        let schema = Schema::from_patterns(&[
            "*a person* really likes *an object* with value *a value*",
            "*a person* is happy",
        ])
        .unwrap();
        let literals = [
            literal("bob spence really likes plates with value 5", 0),
            literal("roses are red violets are blue", 1),
            literal("bob is happy", 2),
        ];
        let diags = unmatched_literals(&schema, &literals);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span.start.line, 1);
        assert_eq!(diags[0].message, LITERAL_HAS_NO_TEMPLATE);
    }

    #[test]
    fn empty_schema_flags_everything() {
        let schema = Schema::from_patterns::<&str>(&[]).unwrap();
        let diags = unmatched_literals(&schema, &[literal("bob is happy", 0)]);
        assert_eq!(diags.len(), 1);
    }
}
