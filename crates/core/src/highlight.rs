//! Classified spans for semantic highlighting.
//!
//! Atomic terms of every matched formula are variables; terms that hold a
//! nested statement contribute the atoms of that statement instead. Control
//! comments are keywords with the `control` modifier.

use crate::directive::ControlComment;
use crate::formula::LocatedFormula;
use crate::span::utf16_len;
use serde::Serialize;

/// Token type legend, in index order.
pub const TOKEN_TYPES: &[&str] = &["variable", "class", "interface", "keyword"];

/// Token modifier legend, in index order.
pub const TOKEN_MODIFIERS: &[&str] = &["declaration", "implementation", "control"];

/// A classified span at an absolute document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticToken {
    pub line: u32,
    pub character: u32,
    pub length: u32,
    pub token_type: u32,
    /// Modifier index, `None` when the span carries no modifier.
    pub token_modifier: Option<u32>,
}

impl SemanticToken {
    fn classified(line: u32, character: u32, length: u32, kind: &str, modifier: Option<&str>) -> Self {
        SemanticToken {
            line,
            character,
            length,
            token_type: encode_token_type(kind),
            token_modifier: modifier.map(encode_token_modifier),
        }
    }
}

/// Index of `name` in the type legend, or `legend length + 2` when absent.
///
/// The out-of-range value leaves the span unstyled instead of failing the request.
pub fn encode_token_type(name: &str) -> u32 {
    TOKEN_TYPES
        .iter()
        .position(|t| *t == name)
        .unwrap_or(TOKEN_TYPES.len() + 2) as u32
}

/// Index of `name` in the modifier legend, with the same sentinel as types.
pub fn encode_token_modifier(name: &str) -> u32 {
    TOKEN_MODIFIERS
        .iter()
        .position(|m| *m == name)
        .unwrap_or(TOKEN_MODIFIERS.len() + 2) as u32
}

pub fn control_comment_tokens(comments: &[ControlComment]) -> Vec<SemanticToken> {
    comments
        .iter()
        .map(|c| {
            SemanticToken::classified(
                c.start.line,
                c.start.character,
                c.length,
                "keyword",
                Some("control"),
            )
        })
        .collect()
}

/// Variable tokens for the atoms of one formula, nested statements included.
///
/// An atom bound across a line break yields one token per line.
pub fn formula_tokens(located: &LocatedFormula) -> Vec<SemanticToken> {
    let content = &located.segment.content;
    let origin = located.segment.span.start;
    let mut tokens = Vec::new();
    for (at, term) in located.formula.atoms() {
        for (offset, piece) in line_pieces(&term.name) {
            let start = origin.advance(&content[..at + offset]);
            tokens.push(SemanticToken::classified(
                start.line,
                start.character,
                utf16_len(piece),
                "variable",
                None,
            ));
        }
    }
    tokens
}

/// Non-blank pieces of `text` on each line, trimmed, with their byte offsets.
fn line_pieces(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            pieces.push((offset + line.len() - line.trim_start().len(), trimmed));
        }
        offset += line.len() + 1;
    }
    pieces
}

/// Control comment tokens first, then the atoms of every formula in order.
pub fn derive_tokens(comments: &[ControlComment], formulas: &[LocatedFormula]) -> Vec<SemanticToken> {
    let mut tokens = control_comment_tokens(comments);
    for formula in formulas {
        tokens.extend(formula_tokens(formula));
    }
    tokens
}
