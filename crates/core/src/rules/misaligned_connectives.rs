use super::{Diagnostic, CLAUSE_HAS_MISALIGNED_CONNECTIVES};
use crate::span::Segment;

const CONNECTIVES: &[&str] = &["and", "or"];

/// Flag clauses where an `and` and an `or` start lines at the same indentation.
pub fn misaligned_connectives(clauses: &[Segment]) -> Vec<Diagnostic> {
    clauses
        .iter()
        .filter(|clause| clause_has_misaligned_connectives(&clause.content))
        .map(|clause| Diagnostic::warning(clause.span, CLAUSE_HAS_MISALIGNED_CONNECTIVES))
        .collect()
}

pub fn clause_has_misaligned_connectives(clause: &str) -> bool {
    let led: Vec<(&str, &str)> = clause.lines().filter_map(leading_connective).collect();
    led.iter().enumerate().any(|(i, (indent, connective))| {
        led[i + 1..]
            .iter()
            .any(|(other_indent, other)| other != connective && other_indent == indent)
    })
}

/// The indentation and keyword of a line that starts with a connective.
fn leading_connective(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start();
    let indent = &line[..line.len() - rest.len()];
    CONNECTIVES.iter().find_map(|connective| {
        let after = rest.strip_prefix(connective)?;
        match after.chars().next() {
            None => Some((indent, *connective)),
            Some(c) if c.is_whitespace() => Some((indent, *connective)),
            Some(_) => None,
        }
    })
}
