//! Document-level control comments.
//!
//! A line ending in `%type checking on` (or `%type checking: on`) switches
//! on the type-mismatch rule for the whole document. The directive lives in
//! a comment, so it is looked for in the raw text.

use crate::span::{utf16_len, Position};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static TYPE_CHECKING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*(%type checking:? on)\s*$").expect("directive pattern"));

/// Where a control comment's keyword text sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlComment {
    pub start: Position,
    /// UTF-16 length of the directive text.
    pub length: u32,
}

pub fn control_comments(raw: &str) -> Vec<ControlComment> {
    raw.lines()
        .enumerate()
        .filter_map(|(line, text)| {
            let directive = TYPE_CHECKING.captures(text)?.get(1)?;
            Some(ControlComment {
                start: Position::new(line as u32, utf16_len(&text[..directive.start()])),
                length: utf16_len(directive.as_str()),
            })
        })
        .collect()
}

pub fn type_checking_enabled(raw: &str) -> bool {
    raw.lines().any(|line| TYPE_CHECKING.is_match(line))
}
