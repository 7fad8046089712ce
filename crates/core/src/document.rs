//! Segmentation of a Logical English document into located fragments.
//!
//! ```text
//! the templates are:
//! *a person* really likes *an object* with value *a value*.
//!
//! the type hierarchy is:
//! an employee is a type of a person.
//!
//! the knowledge base likes includes:
//! a person is happy
//! if the person really likes an object with value a value.
//!
//! scenario one is:
//! bob spence really likes plates with value 5.
//! ```
//!
//! Statements end at a `.` followed by whitespace or the end of the text.
//! Every fragment keeps the exact byte range it came from, so spans are
//! computed rather than searched for.

use crate::span::Segment;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(the templates are)|(the type hierarchy is)|(the knowledge base\b.*\bincludes)|(scenario\b.*\bis)|(query\b.*\bis))\s*:\s*$",
    )
    .expect("section header pattern")
});

static LEADING_CONNECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:it is not the case that|if|and|or)(?:\s+|$)").expect("connective pattern")
});

static INLINE_IF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+if(?:\s+|$)").expect("inline if pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    Templates,
    TypeHierarchy,
    KnowledgeBase,
    Scenario,
    Query,
}

/// The located fragments of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentSegments {
    pub templates: Vec<Segment>,
    pub type_declarations: Vec<Segment>,
    /// Statements of knowledge bases, scenarios and queries.
    pub clauses: Vec<Segment>,
    /// The atomic statements inside every clause.
    pub literals: Vec<Segment>,
}

/// Blank every `%` comment with spaces, keeping offsets and line breaks intact.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_comment = false;
    for ch in text.chars() {
        if ch == '\n' {
            in_comment = false;
            out.push(ch);
        } else if in_comment || ch == '%' {
            in_comment = true;
            for _ in 0..ch.len_utf8() {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split comment-free document text into templates, type declarations,
/// clauses and literals.
pub fn segment(text: &str) -> DocumentSegments {
    let mut segments = DocumentSegments::default();
    for (kind, body) in sections(text) {
        for statement in statements(text, body) {
            match kind {
                SectionKind::Templates => segments
                    .templates
                    .push(Segment::from_range(text, statement)),
                SectionKind::TypeHierarchy => segments
                    .type_declarations
                    .push(Segment::from_range(text, statement)),
                SectionKind::KnowledgeBase | SectionKind::Scenario | SectionKind::Query => {
                    segments
                        .literals
                        .extend(literals_in_clause(text, statement.clone()));
                    segments.clauses.push(Segment::from_range(text, statement));
                }
            }
        }
    }
    tracing::debug!(
        templates = segments.templates.len(),
        type_declarations = segments.type_declarations.len(),
        clauses = segments.clauses.len(),
        literals = segments.literals.len(),
        "document segmented"
    );
    segments
}

/// Section kinds with the byte range of their bodies, in document order.
pub fn sections(text: &str) -> Vec<(SectionKind, Range<usize>)> {
    let mut out = Vec::new();
    let mut current: Option<(SectionKind, usize)> = None;
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let Some(caps) = SECTION_HEADER.captures(line.trim_end_matches(['\n', '\r'])) else {
            continue;
        };
        let kind = if caps.get(1).is_some() {
            SectionKind::Templates
        } else if caps.get(2).is_some() {
            SectionKind::TypeHierarchy
        } else if caps.get(3).is_some() {
            SectionKind::KnowledgeBase
        } else if caps.get(4).is_some() {
            SectionKind::Scenario
        } else {
            SectionKind::Query
        };
        if let Some((previous, body_start)) = current.take() {
            out.push((previous, body_start..line_start));
        }
        current = Some((kind, offset));
    }
    if let Some((kind, body_start)) = current {
        out.push((kind, body_start..text.len()));
    }
    out
}

/// Trimmed statement ranges inside `body`. A trailing statement with no
/// closing `.` still counts; it is usually the one being typed.
fn statements(text: &str, body: Range<usize>) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut start = body.start;
    for i in body.clone() {
        if bytes[i] != b'.' {
            continue;
        }
        let at_boundary = i + 1 >= body.end || (bytes[i + 1] as char).is_ascii_whitespace();
        if at_boundary {
            if let Some(range) = trim_range(text, start..i) {
                out.push(range);
            }
            start = i + 1;
        }
    }
    if let Some(range) = trim_range(text, start..body.end) {
        out.push(range);
    }
    out
}

/// Split a clause into its atomic statements.
///
/// A new literal starts on the first line, after a leading connective
/// (`if`, `and`, `or`, `it is not the case that`) and after an inline
/// ` if `. Any other line continues the literal above it.
pub fn literals_in_clause(text: &str, clause: Range<usize>) -> Vec<Segment> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut current: Option<Range<usize>> = None;
    let mut offset = clause.start;

    for line in text[clause.clone()].split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let body = line.trim_end_matches(['\n', '\r']);
        let indent = body.len() - body.trim_start().len();
        let rest = &body[indent..];
        if rest.trim().is_empty() {
            continue;
        }

        let (skip, starts_new) = match LEADING_CONNECTIVE.find(rest) {
            Some(m) => (m.end(), true),
            None => (0, current.is_none()),
        };
        let piece_start = line_start + indent + skip;
        let piece_end = line_start + body.len();
        let pieces = split_inline_if(text, piece_start..piece_end);

        for (index, piece) in pieces.into_iter().enumerate() {
            if index == 0 && !starts_new {
                if let Some(open) = current.as_mut() {
                    open.end = piece.end;
                    continue;
                }
            }
            if let Some(done) = current.replace(piece) {
                ranges.push(done);
            }
        }
    }
    if let Some(done) = current {
        ranges.push(done);
    }

    ranges
        .into_iter()
        .filter_map(|r| trim_range(text, r))
        .map(|r| Segment::from_range(text, r))
        .collect()
}

fn split_inline_if(text: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = range.start;
    for m in INLINE_IF.find_iter(&text[range.clone()]) {
        pieces.push(start..range.start + m.start());
        start = range.start + m.end();
    }
    pieces.push(start..range.end);
    pieces
}

/// Trim whitespace and trailing `.`/`,` from a range; `None` when nothing is left.
fn trim_range(text: &str, range: Range<usize>) -> Option<Range<usize>> {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice
        .trim_end()
        .trim_end_matches(['.', ','])
        .trim_end();
    let start = range.start + leading;
    let end = range.start + trimmed.len();
    (end > start).then_some(start..end)
}
