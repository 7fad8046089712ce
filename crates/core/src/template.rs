//! Template declarations and the alignment that scores literals against them.
//!
//! A template such as `*a person* really likes *an object*` is a sequence of
//! surrounding phrases and typed slots. Alignment walks a candidate text left
//! to right: surrounding phrases must appear literally (case-insensitive,
//! whitespace-normalized) and every slot takes the shortest non-empty run of
//! words before the next phrase. The same alignment drives both the
//! incremental score and the full match that builds a [`Formula`].

use crate::error::SchemaError;
use crate::formula::Formula;
use crate::schema::Schema;
use crate::types::{normalize_type_name, TypeId, TypeTreeBuilder};
use serde::Serialize;
use std::ops::Range;

/// Credit for a slot whose filler runs to the end of an incomplete text.
///
/// Such a slot is only evidence that *something* was typed, so it earns a
/// tenth of a unit. Text that never reaches a surrounding phrase of a
/// slot-first template therefore scores close to zero.
const OPEN_SLOT_CREDIT: f64 = 0.1;

/// Share of its credit a partly typed phrase earns behind an open slot.
/// The same letters may still turn out to be part of the filler.
const OPEN_PHRASE_WEIGHT: f64 = 0.5;

/// Words that cannot name a slot type; they split clauses into literals.
const RESERVED_TYPE_NAMES: &[&str] = &["and", "or", "if", "not"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplateElement {
    /// A fixed phrase, with its whitespace collapsed.
    Surrounding(String),
    /// A placeholder bound to a declared type.
    TypeSlot(TypeId),
}

#[derive(Debug, Clone, Serialize)]
pub struct Template {
    source: String,
    elements: Vec<TemplateElement>,
    /// Lower-cased words of each surrounding element; empty for slots.
    #[serde(skip)]
    words: Vec<Vec<String>>,
}

/// Outcome of aligning one candidate text against a template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Alignment {
    /// Aligned units, fractional for a word typed halfway.
    pub credit: f64,
    /// Units the template needs for a complete match.
    pub total: usize,
    /// Candidate words the alignment could not explain.
    pub leftover: usize,
    /// Every element aligned and every word consumed.
    pub complete: bool,
    /// Byte range of the text bound to each aligned element, in element order.
    pub ranges: Vec<Range<usize>>,
}

impl Alignment {
    pub fn score(&self) -> f64 {
        if self.complete {
            return 1.0;
        }
        let denominator = (self.total + self.leftover) as f64;
        if denominator == 0.0 {
            0.0
        } else {
            self.credit / denominator
        }
    }
}

enum PhraseMatch {
    Full,
    /// The text ran out inside the phrase.
    Partial(f64),
    /// A word disagreed with the phrase after this many matched words.
    Mismatch(usize),
}

impl Template {
    /// Parse a template declaration, declaring unseen slot types in `types`.
    pub fn parse(raw: &str, types: &mut TypeTreeBuilder) -> Result<Template, SchemaError> {
        let mut elements = Vec::new();
        let mut words = Vec::new();
        let mut outside = String::new();
        let mut placeholder = String::new();
        let mut in_placeholder = false;

        for ch in raw.chars() {
            if ch != '*' {
                if in_placeholder {
                    placeholder.push(ch);
                } else {
                    outside.push(ch);
                }
                continue;
            }
            if in_placeholder {
                let name = normalize_type_name(&placeholder);
                if name.is_empty() {
                    return Err(SchemaError::malformed_template(raw, "empty placeholder"));
                }
                if RESERVED_TYPE_NAMES.contains(&name.as_str()) {
                    return Err(SchemaError::malformed_template(
                        raw,
                        format!("placeholder type '{}' collides with a connective", name),
                    ));
                }
                elements.push(TemplateElement::TypeSlot(types.declare(&name)));
                words.push(Vec::new());
                placeholder.clear();
            } else {
                push_surrounding(&mut elements, &mut words, &outside);
                outside.clear();
            }
            in_placeholder = !in_placeholder;
        }

        if in_placeholder {
            return Err(SchemaError::malformed_template(
                raw,
                "unterminated placeholder",
            ));
        }
        push_surrounding(&mut elements, &mut words, &outside);

        if !elements
            .iter()
            .any(|e| matches!(e, TemplateElement::Surrounding(_)))
        {
            return Err(SchemaError::malformed_template(
                raw,
                "template has no surrounding words",
            ));
        }

        Ok(Template {
            source: raw.trim().to_owned(),
            elements,
            words,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn elements(&self) -> &[TemplateElement] {
        &self.elements
    }

    /// How well `text` aligns with this template, from 0 (nothing) to 1 (a complete match).
    ///
    /// Incomplete text, including text that stops in the middle of a word,
    /// scores strictly between the two as long as it is a prefix of some
    /// instantiation. An incomplete text never scores below an incomplete
    /// prefix of itself: letters that first looked like the next phrase and
    /// then turned out to be filler keep the credit they earned.
    pub fn match_score(&self, text: &str) -> f64 {
        let alignment = self.align(text);
        let score = if alignment.complete {
            1.0
        } else {
            text.char_indices()
                .skip(1)
                .map(|(end, _)| self.align(&text[..end]))
                .filter(|prefix| !prefix.complete)
                .map(|prefix| prefix.score())
                .fold(alignment.score(), f64::max)
        };
        tracing::trace!(template = %self.source, text, score, "aligned literal");
        score
    }

    /// Match `text` completely, building its formula with slot fillers bound as terms.
    pub fn matches_literal(&self, text: &str, schema: &Schema) -> Option<Formula> {
        let alignment = self.align(text);
        if !alignment.complete {
            return None;
        }
        Some(Formula::from_alignment(text, self, &alignment, schema))
    }

    pub fn matches_formula(&self, text: &str, schema: &Schema) -> bool {
        self.matches_literal(text, schema).is_some()
    }

    fn total_units(&self) -> usize {
        self.words
            .iter()
            .map(|w| if w.is_empty() { 1 } else { w.len() })
            .sum()
    }

    pub(crate) fn align(&self, text: &str) -> Alignment {
        let words = split_words(text);
        let end = words.len();
        let mut alignment = Alignment {
            credit: 0.0,
            total: self.total_units(),
            leftover: 0,
            complete: false,
            ranges: Vec::with_capacity(self.elements.len()),
        };
        let mut cursor = 0usize;

        for (index, element) in self.elements.iter().enumerate() {
            match element {
                TemplateElement::Surrounding(_) => {
                    let phrase = &self.words[index];
                    match match_phrase_at(&words, cursor, phrase) {
                        PhraseMatch::Full => {
                            alignment.credit += phrase.len() as f64;
                            alignment
                                .ranges
                                .push(word_range(&words, cursor, cursor + phrase.len()));
                            cursor += phrase.len();
                        }
                        PhraseMatch::Partial(credit) => {
                            alignment.credit += credit;
                            return alignment;
                        }
                        PhraseMatch::Mismatch(matched) => {
                            alignment.credit += matched as f64;
                            alignment.leftover = end - cursor - matched;
                            return alignment;
                        }
                    }
                }
                TemplateElement::TypeSlot(_) => {
                    if cursor == end {
                        return alignment;
                    }
                    match self.elements.get(index + 1) {
                        None => {
                            alignment.credit += 1.0;
                            alignment.ranges.push(word_range(&words, cursor, end));
                            cursor = end;
                        }
                        Some(TemplateElement::TypeSlot(_)) => {
                            alignment.credit += 1.0;
                            alignment.ranges.push(word_range(&words, cursor, cursor + 1));
                            cursor += 1;
                        }
                        Some(TemplateElement::Surrounding(_)) => {
                            let phrase = &self.words[index + 1];
                            if let Some(at) = find_phrase(&words, cursor + 1, phrase) {
                                alignment.credit += 1.0;
                                alignment.ranges.push(word_range(&words, cursor, at));
                                cursor = at;
                            } else if let Some((at, credit)) =
                                find_phrase_prefix(&words, cursor + 1, phrase)
                            {
                                alignment.credit += OPEN_SLOT_CREDIT + OPEN_PHRASE_WEIGHT * credit;
                                alignment.ranges.push(word_range(&words, cursor, at));
                                return alignment;
                            } else {
                                alignment.credit += OPEN_SLOT_CREDIT;
                                alignment.ranges.push(word_range(&words, cursor, end));
                                return alignment;
                            }
                        }
                    }
                }
            }
        }

        alignment.leftover = end - cursor;
        alignment.complete = cursor == end;
        alignment
    }
}

fn push_surrounding(elements: &mut Vec<TemplateElement>, words: &mut Vec<Vec<String>>, raw: &str) {
    let phrase_words: Vec<&str> = raw.split_whitespace().collect();
    if phrase_words.is_empty() {
        return;
    }
    elements.push(TemplateElement::Surrounding(phrase_words.join(" ")));
    words.push(phrase_words.iter().map(|w| w.to_lowercase()).collect());
}

/// Whitespace-separated words of `text` with their byte offsets.
fn split_words(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s, &text[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

fn word_range(words: &[(usize, &str)], from: usize, to: usize) -> Range<usize> {
    if from >= to {
        let at = words.get(from).map(|(o, _)| *o).unwrap_or_else(|| {
            words.last().map(|(o, w)| o + w.len()).unwrap_or(0)
        });
        return at..at;
    }
    let (start, _) = words[from];
    let (last, word) = words[to - 1];
    start..last + word.len()
}

fn word_eq(candidate: &str, expected: &str) -> bool {
    candidate
        .chars()
        .flat_map(char::to_lowercase)
        .eq(expected.chars().flat_map(char::to_lowercase))
}

/// Fraction of `expected` covered when `partial` is a prefix of it.
fn prefix_fraction(partial: &str, expected: &str) -> Option<f64> {
    let mut expected_chars = expected.chars().flat_map(char::to_lowercase);
    let mut matched = 0usize;
    for ch in partial.chars().flat_map(char::to_lowercase) {
        if expected_chars.next() != Some(ch) {
            return None;
        }
        matched += 1;
    }
    let total = matched + expected_chars.count();
    if total == 0 {
        return None;
    }
    Some(matched as f64 / total as f64)
}

fn match_phrase_at(words: &[(usize, &str)], at: usize, phrase: &[String]) -> PhraseMatch {
    for (i, expected) in phrase.iter().enumerate() {
        let Some((_, word)) = words.get(at + i) else {
            return PhraseMatch::Partial(i as f64);
        };
        if word_eq(word, expected) {
            continue;
        }
        if at + i + 1 == words.len() {
            if let Some(fraction) = prefix_fraction(word, expected) {
                return PhraseMatch::Partial(i as f64 + fraction);
            }
        }
        return PhraseMatch::Mismatch(i);
    }
    PhraseMatch::Full
}

/// First index at or after `from` where `phrase` occurs in full.
fn find_phrase(words: &[(usize, &str)], from: usize, phrase: &[String]) -> Option<usize> {
    (from..words.len()).find(|&at| {
        at + phrase.len() <= words.len()
            && phrase
                .iter()
                .zip(&words[at..])
                .all(|(expected, (_, word))| word_eq(word, expected))
    })
}

/// First index at or after `from` where the rest of the text is a proper
/// prefix of `phrase`, with the credit that prefix earns.
fn find_phrase_prefix(words: &[(usize, &str)], from: usize, phrase: &[String]) -> Option<(usize, f64)> {
    (from..words.len()).find_map(|at| match match_phrase_at(words, at, phrase) {
        PhraseMatch::Partial(credit) => Some((at, credit)),
        PhraseMatch::Full | PhraseMatch::Mismatch(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIKES: &str = "*a person* really likes *an object* with value *a value*";

    fn template(raw: &str) -> Template {
        let mut types = TypeTreeBuilder::new();
        Template::parse(raw, &mut types).unwrap()
    }

    #[test]
    fn parse_splits_surroundings_and_slots() {
        let mut types = TypeTreeBuilder::new();
        let t = Template::parse(LIKES, &mut types).unwrap();
        let person = types.get("person").unwrap();
        let object = types.get("object").unwrap();
        let value = types.get("value").unwrap();
        assert_eq!(
            t.elements(),
            &[
                TemplateElement::TypeSlot(person),
                TemplateElement::Surrounding("really likes".into()),
                TemplateElement::TypeSlot(object),
                TemplateElement::Surrounding("with value".into()),
                TemplateElement::TypeSlot(value),
            ]
        );
    }

    #[test]
    fn parse_rejects_empty_placeholder() {
        let mut types = TypeTreeBuilder::new();
        let err = Template::parse("*a* is happy", &mut types).unwrap_err();
        assert!(err.to_string().contains("empty placeholder"), "{}", err);
        let err = Template::parse("** is happy", &mut types).unwrap_err();
        assert!(err.to_string().contains("empty placeholder"), "{}", err);
    }

    #[test]
    fn parse_rejects_unterminated_placeholder() {
        let mut types = TypeTreeBuilder::new();
        let err = Template::parse("*a person is happy", &mut types).unwrap_err();
        assert!(err.to_string().contains("unterminated"), "{}", err);
    }

    #[test]
    fn parse_rejects_slot_only_template() {
        let mut types = TypeTreeBuilder::new();
        assert!(Template::parse("*a person*", &mut types).is_err());
    }

    #[test]
    fn parse_rejects_connective_type_name() {
        let mut types = TypeTreeBuilder::new();
        let err = Template::parse("*an and* holds", &mut types).unwrap_err();
        assert!(err.to_string().contains("connective"), "{}", err);
    }

    #[test]
    fn complete_instantiation_scores_one() {
        let t = template(LIKES);
        assert_eq!(t.match_score("bob spence really likes plates with value 5"), 1.0);
        assert_eq!(
            t.match_score("  Bob   Spence REALLY likes plates\nwith  value 5 "),
            1.0
        );
    }

    #[test]
    fn prefixes_score_strictly_decreasing() {
        let t = template(LIKES);
        let scores: Vec<f64> = [
            "bob spence really likes plates with value 5",
            "bob spence really likes plates wit",
            "bob spence really likes",
            "bob spence reall",
            "bob spence",
        ]
        .iter()
        .map(|s| t.match_score(s))
        .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1], "scores not decreasing: {:?}", scores);
        }
        assert!(scores[4] > 0.0);
    }

    /// Walk every character prefix of `full` and check the score never drops.
    fn assert_monotonic(t: &Template, full: &str) {
        let mut previous = 0.0;
        for (i, _) in full.char_indices().skip(1) {
            let prefix = &full[..i];
            let score = t.match_score(prefix);
            assert!(
                score >= previous,
                "prefix {:?} scored {} after {}",
                prefix,
                score,
                previous
            );
            previous = score;
        }
        assert_eq!(t.match_score(full), 1.0);
    }

    #[test]
    fn growing_prefix_never_lowers_score() {
        let t = template(LIKES);
        let full = "bob spence really likes plates with value 5";
        assert_monotonic(&t, full);
        for (i, _) in full.char_indices().skip(1) {
            assert!(t.match_score(&full[..i]) < 1.0, "{:?}", &full[..i]);
        }
    }

    #[test]
    fn filler_that_starts_like_the_next_phrase_keeps_its_credit() {
        let t = template(LIKES);
        for full in [
            "bob roberts really likes plates with value 5",
            "bob reader really likes reels with value 5",
            "bob really likesx really likes plates with value 5",
            "bob spence really likes wine with wit with value 5",
            "ralph really likes values with value 5",
        ] {
            assert_monotonic(&t, full);
        }
        assert!(t.match_score("bob ro") >= t.match_score("bob r"));
        assert!(t.match_score("bob r") > t.match_score("bob"));
    }

    #[test]
    fn unrelated_text_scores_near_zero() {
        let t = template(LIKES);
        assert!(t.match_score("roses are red violets are blue") < 0.05);
        let t = template("the amount of gain is *an amount*");
        assert_eq!(t.match_score("roses are red violets are blue"), 0.0);
    }

    #[test]
    fn trailing_words_prevent_a_full_score() {
        let t = template("*a person* is happy");
        assert_eq!(t.match_score("bob is happy"), 1.0);
        let score = t.match_score("bob is happy today");
        assert!(score > 0.0 && score < 1.0, "{}", score);
    }

    #[test]
    fn slots_take_the_shortest_run_before_the_next_phrase() {
        let t = template(LIKES);
        let text = "bob really likes x really likes y with value 1";
        let a = t.align(text);
        assert!(a.complete);
        assert_eq!(&text[a.ranges[0].clone()], "bob");
        assert_eq!(&text[a.ranges[2].clone()], "x really likes y");
    }

    #[test]
    fn adjacent_slots_take_one_word_each() {
        let t = template("*a person* *a verb* the ball");
        let text = "alice kicks the ball";
        let a = t.align(text);
        assert!(a.complete);
        assert_eq!(&text[a.ranges[0].clone()], "alice");
        assert_eq!(&text[a.ranges[1].clone()], "kicks");
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(template(LIKES).match_score(""), 0.0);
        assert_eq!(template(LIKES).match_score("   "), 0.0);
    }
}
