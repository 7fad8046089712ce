//! Parsed statements: the tree produced by matching text against a template.

use crate::schema::Schema;
use crate::span::{Segment, SourceSpan};
use crate::template::{Alignment, Template, TemplateElement};
use crate::types::TypeId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TermKind {
    Atom,
    /// The bound text is itself a statement matching one of the schema's templates.
    SubFormula(Box<Formula>),
}

/// A slot's bound value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub name: String,
    pub ty: TypeId,
    /// Byte offset of `name` inside the enclosing formula's text.
    pub offset: usize,
    pub kind: TermKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormulaElement {
    Surrounding { phrase: String, offset: usize },
    Term(Term),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formula {
    /// The full matched text.
    pub name: String,
    pub elements: Vec<FormulaElement>,
}

impl Formula {
    /// Build the formula for a complete alignment of `text`.
    ///
    /// Slots whose type admits sub-statements are matched again against the
    /// whole template catalog. The nested text is always shorter than `text`
    /// because every template has at least one surrounding phrase.
    pub(crate) fn from_alignment(
        text: &str,
        template: &Template,
        alignment: &Alignment,
        schema: &Schema,
    ) -> Formula {
        let elements = template
            .elements()
            .iter()
            .zip(&alignment.ranges)
            .map(|(element, range)| {
                let bound = &text[range.clone()];
                match element {
                    TemplateElement::Surrounding(_) => FormulaElement::Surrounding {
                        phrase: bound.to_owned(),
                        offset: range.start,
                    },
                    TemplateElement::TypeSlot(ty) => {
                        let kind = if schema.types().admits_sub_statements(*ty)
                            && bound.len() < text.len()
                        {
                            schema
                                .match_literal(bound)
                                .map(|nested| TermKind::SubFormula(Box::new(nested)))
                                .unwrap_or(TermKind::Atom)
                        } else {
                            TermKind::Atom
                        };
                        FormulaElement::Term(Term {
                            name: bound.to_owned(),
                            ty: *ty,
                            offset: range.start,
                            kind,
                        })
                    }
                }
            })
            .collect();

        Formula {
            name: text.to_owned(),
            elements,
        }
    }

    /// Terms bound directly by this formula.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.elements.iter().filter_map(|e| match e {
            FormulaElement::Term(t) => Some(t),
            FormulaElement::Surrounding { .. } => None,
        })
    }

    /// Every term in the tree, nested ones included, with offsets relative to this formula.
    pub fn all_terms(&self) -> Vec<(usize, &Term)> {
        let mut out = Vec::new();
        self.collect_terms(0, &mut out, false);
        out
    }

    /// Atomic terms of the tree; sub-formula terms are replaced by their own atoms.
    pub fn atoms(&self) -> Vec<(usize, &Term)> {
        let mut out = Vec::new();
        self.collect_terms(0, &mut out, true);
        out
    }

    fn collect_terms<'a>(&'a self, base: usize, out: &mut Vec<(usize, &'a Term)>, atoms_only: bool) {
        for term in self.terms() {
            let at = base + term.offset;
            match &term.kind {
                TermKind::Atom => out.push((at, term)),
                TermKind::SubFormula(nested) => {
                    if !atoms_only {
                        out.push((at, term));
                    }
                    nested.collect_terms(at, out, atoms_only);
                }
            }
        }
    }
}

/// A formula together with the segment it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedFormula {
    pub segment: Segment,
    pub formula: Formula,
}

/// A term and where it sits in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedTerm<'a> {
    pub term: &'a Term,
    pub span: SourceSpan,
}

impl LocatedFormula {
    pub fn terms(&self) -> Vec<LocatedTerm<'_>> {
        self.formula
            .all_terms()
            .into_iter()
            .map(|(at, term)| LocatedTerm {
                term,
                span: self
                    .segment
                    .span
                    .sub_span(&self.segment.content, at..at + term.name.len()),
            })
            .collect()
    }
}
