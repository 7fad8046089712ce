//! The templates and type hierarchy declared by one document.

use crate::error::SchemaError;
use crate::formula::Formula;
use crate::span::Segment;
use crate::template::Template;
use crate::types::{TypeTree, TypeTreeBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `<child> is a type of <parent>`, also accepting `subtype` and `kind`.
static TYPE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(.+?)\s+is\s+an?\s+(?:type|subtype|sub-type|kind)\s+of\s+(.+?)\s*\.?\s*$")
        .expect("type declaration pattern")
});

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    templates: Vec<Template>,
    types: TypeTree,
}

impl Schema {
    /// Build the schema from template declarations and type hierarchy lines.
    ///
    /// Hierarchy lines are read first so that template slots resolve against
    /// the declared names; a slot naming an unseen type declares it.
    pub fn build(templates: &[Segment], type_declarations: &[Segment]) -> Result<Schema, SchemaError> {
        let mut builder = TypeTreeBuilder::new();

        for declaration in type_declarations {
            let (child, parent) = parse_type_declaration(&declaration.content)
                .map_err(|e| e.with_span(declaration.span))?;
            let parent = builder.declare(parent);
            let child = builder.declare(child);
            builder.make_subtype_at(parent, child, Some(declaration.span))?;
        }

        let mut parsed = Vec::with_capacity(templates.len());
        for segment in templates {
            let template = Template::parse(&segment.content, &mut builder)
                .map_err(|e| e.with_span(segment.span))?;
            parsed.push(template);
        }

        let types = builder.finish()?;
        tracing::debug!(
            templates = parsed.len(),
            types = types.len(),
            "schema built"
        );
        Ok(Schema {
            templates: parsed,
            types,
        })
    }

    /// Build a schema from raw template patterns with no hierarchy.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Schema, SchemaError> {
        let mut builder = TypeTreeBuilder::new();
        let templates = patterns
            .iter()
            .map(|p| Template::parse(p.as_ref(), &mut builder))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema {
            templates,
            types: builder.finish()?,
        })
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn types(&self) -> &TypeTree {
        &self.types
    }

    /// The formula of the first template that matches `text` completely.
    pub fn match_literal(&self, text: &str) -> Option<Formula> {
        self.templates
            .iter()
            .find_map(|template| template.matches_literal(text, self))
    }

    pub fn matches_formula(&self, text: &str) -> bool {
        self.templates
            .iter()
            .any(|template| template.matches_formula(text, self))
    }

    /// The template that aligns best with `text` and its score.
    ///
    /// Ties go to the template declared first.
    pub fn best_match(&self, text: &str) -> Option<(&Template, f64)> {
        self.templates
            .iter()
            .map(|t| (t, t.match_score(text)))
            .fold(None, |best, (t, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((t, score)),
            })
    }
}

/// Split `<child> is a type of <parent>` into its two type names.
fn parse_type_declaration(content: &str) -> Result<(&str, &str), SchemaError> {
    let malformed = || SchemaError::MalformedTypeDeclaration {
        declaration: content.trim().to_owned(),
        span: None,
    };
    let caps = TYPE_DECLARATION.captures(content).ok_or_else(malformed)?;
    match (caps.get(1), caps.get(2)) {
        (Some(child), Some(parent)) => Ok((child.as_str(), parent.as_str())),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{FormulaElement, TermKind};
    use crate::span::{Position, SourceSpan};

    fn seg(content: &str, line: u32) -> Segment {
        Segment::new(content, SourceSpan::covering(Position::new(line, 0), content))
    }

    #[test]
    fn match_literal_binds_slot_fillers() {
        let schema =
            Schema::from_patterns(&["*a person* really likes *an object* with value *a value*"])
                .unwrap();
        let formula = schema
            .match_literal("bob spence really likes plates with value 5")
            .expect("formula");
        let bound: Vec<&str> = formula.terms().map(|t| t.name.as_str()).collect();
        assert_eq!(bound, vec!["bob spence", "plates", "5"]);
        let names: Vec<&str> = formula
            .terms()
            .map(|t| schema.types().name(t.ty))
            .collect();
        assert_eq!(names, vec!["person", "object", "value"]);
        assert!(formula.terms().all(|t| t.kind == TermKind::Atom));
    }

    #[test]
    fn unmatched_text_has_no_formula() {
        let schema =
            Schema::from_patterns(&["*a person* really likes *an object* with value *a value*"])
                .unwrap();
        assert!(schema.match_literal("roses are red violets are blue").is_none());
        assert!(!schema.matches_formula("roses are red violets are blue"));
    }

    #[test]
    fn statement_slots_nest_formulas() {
        let schema = Schema::build(
            &[
                seg("*a person* believes that *a statement*", 0),
                seg("*a person* really likes *an object*", 1),
            ],
            &[],
        )
        .unwrap();
        let formula = schema
            .match_literal("alice believes that bob really likes plates")
            .expect("formula");
        let nested = formula
            .terms()
            .find_map(|t| match &t.kind {
                TermKind::SubFormula(f) => Some(f),
                TermKind::Atom => None,
            })
            .expect("nested statement");
        let inner: Vec<&str> = nested.terms().map(|t| t.name.as_str()).collect();
        assert_eq!(inner, vec!["bob", "plates"]);

        let atoms: Vec<(usize, &str)> = formula
            .atoms()
            .into_iter()
            .map(|(at, t)| (at, t.name.as_str()))
            .collect();
        assert_eq!(atoms, vec![(0, "alice"), (20, "bob"), (37, "plates")]);
    }

    #[test]
    fn statement_slot_falls_back_to_atom() {
        let schema = Schema::build(&[seg("*a person* believes that *a statement*", 0)], &[]).unwrap();
        let formula = schema
            .match_literal("alice believes that the sky is green")
            .expect("formula");
        let last = formula.elements.last().unwrap();
        assert!(matches!(
            last,
            FormulaElement::Term(t) if t.kind == TermKind::Atom && t.name == "the sky is green"
        ));
    }

    #[test]
    fn hierarchy_lines_declare_subtypes() {
        let schema = Schema::build(
            &[seg("*a person* owns *an asset*", 0)],
            &[
                seg("an employee is a type of a person", 3),
                seg("a house is a kind of an asset.", 4),
            ],
        )
        .unwrap();
        let types = schema.types();
        let person = types.get("person").unwrap();
        let employee = types.get("employee").unwrap();
        let house = types.get("house").unwrap();
        assert!(types.are_compatible_types(person, employee));
        assert!(!types.are_compatible_types(employee, house));
    }

    #[test]
    fn build_reports_malformed_template_with_span() {
        let err = Schema::build(&[seg("*a person is happy", 7)], &[]).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedTemplate { .. }));
        assert_eq!(err.span().map(|s| s.start.line), Some(7));
    }

    #[test]
    fn build_reports_self_subtype_and_cycles() {
        let err = Schema::build(&[], &[seg("a person is a type of a person", 2)]).unwrap_err();
        assert!(matches!(err, SchemaError::SelfSubtype { .. }));
        assert_eq!(err.span().map(|s| s.start.line), Some(2));

        let err = Schema::build(
            &[],
            &[
                seg("a cat is a type of a dog", 0),
                seg("a dog is a type of a cat", 1),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::SubtypeCycle { .. }), "{:?}", err);
    }

    #[test]
    fn malformed_type_declaration_is_rejected() {
        let err = Schema::build(&[], &[seg("persons are people", 0)]).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedTypeDeclaration { .. }));
    }

    #[test]
    fn best_match_prefers_highest_score() {
        let schema = Schema::from_patterns(&["*a person* is happy", "*a person* really likes *an object*"])
            .unwrap();
        let (template, score) = schema.best_match("bob really li").unwrap();
        assert_eq!(template.source(), "*a person* really likes *an object*");
        assert!(score > 0.0 && score < 1.0);
    }
}
