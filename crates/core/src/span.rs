//! Source positions and located text fragments.
//!
//! Lines are zero-based. Characters count UTF-16 code units, the default
//! position encoding of the language server protocol.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }

    /// The position reached after walking over `text` starting here.
    pub fn advance(self, text: &str) -> Position {
        match text.rfind('\n') {
            None => Position {
                line: self.line,
                character: self.character + utf16_len(text),
            },
            Some(last) => Position {
                line: self.line + text.matches('\n').count() as u32,
                character: utf16_len(&text[last + 1..]),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn new(start: Position, end: Position) -> Self {
        SourceSpan { start, end }
    }

    /// The span of `content` when it begins at `start`.
    pub fn covering(start: Position, content: &str) -> Self {
        SourceSpan {
            start,
            end: start.advance(content),
        }
    }

    /// The span of `content[range]` for a fragment whose own span starts at `self.start`.
    pub fn sub_span(&self, content: &str, range: std::ops::Range<usize>) -> SourceSpan {
        let start = self.start.advance(&content[..range.start]);
        SourceSpan::covering(start, &content[range])
    }
}

/// A located piece of document text: a template declaration, clause,
/// literal or type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub content: String,
    pub span: SourceSpan,
}

impl Segment {
    pub fn new(content: impl Into<String>, span: SourceSpan) -> Self {
        Segment {
            content: content.into(),
            span,
        }
    }

    /// Build a segment for `document[range]`, computing its span from the offsets.
    pub fn from_range(document: &str, range: std::ops::Range<usize>) -> Self {
        let start = Position::default().advance(&document[..range.start]);
        let content = &document[range];
        Segment {
            content: content.to_owned(),
            span: SourceSpan::covering(start, content),
        }
    }

    /// Locate each of `contents` verbatim in `document`, in order, searching
    /// onward from the end of the previous match.
    ///
    /// Text that does not occur, for example because the producer normalized
    /// its whitespace, gets no segment and is left out of the result.
    pub fn locate_all<S: AsRef<str>>(document: &str, contents: &[S]) -> Vec<Self> {
        let mut cursor = 0;
        let mut located = Vec::with_capacity(contents.len());
        for content in contents {
            let content = content.as_ref();
            match document[cursor..].find(content) {
                Some(found) => {
                    let at = cursor + found;
                    cursor = at + content.len();
                    located.push(Segment::from_range(document, at..cursor));
                }
                None => tracing::debug!(content, "text not found in document, skipped"),
            }
        }
        located
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(0, 0)
    }
}

pub fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}
