//! Scoring and matching against the "really likes" template.

use le_core::{Schema, TermKind};

const LIKES: &str = "*a person* really likes *an object* with value *a value*";
const COMPLETE: &str = "bob spence really likes plates with value 5";

fn schema() -> Schema {
    Schema::from_patterns(&[LIKES]).unwrap()
}

#[test]
fn complete_instantiation_scores_one_and_binds_fillers() {
    let schema = schema();
    let template = &schema.templates()[0];
    assert_eq!(template.match_score(COMPLETE), 1.0);

    let formula = schema.match_literal(COMPLETE).expect("formula");
    assert_eq!(formula.name, COMPLETE);
    let bound: Vec<(&str, &str)> = formula
        .terms()
        .map(|t| (t.name.as_str(), schema.types().name(t.ty)))
        .collect();
    assert_eq!(
        bound,
        vec![("bob spence", "person"), ("plates", "object"), ("5", "value")]
    );
    assert!(formula.terms().all(|t| t.kind == TermKind::Atom));
}

#[test]
fn shorter_prefixes_score_strictly_lower() {
    let schema = schema();
    let template = &schema.templates()[0];
    let scores: Vec<f64> = [
        COMPLETE,
        "bob spence really likes plates wit",
        "bob spence really likes",
        "bob spence reall",
        "bob spence",
    ]
    .iter()
    .map(|p| template.match_score(p))
    .collect();

    for pair in scores.windows(2) {
        assert!(pair[0] > pair[1], "{:?}", scores);
    }
    assert!(scores.iter().all(|s| *s > 0.0 && *s <= 1.0), "{:?}", scores);
}

#[test]
fn unrelated_text_scores_near_zero_and_does_not_match() {
    let schema = schema();
    let template = &schema.templates()[0];
    let text = "roses are red violets are blue";
    assert!(template.match_score(text) < 0.05);
    assert!(schema.match_literal(text).is_none());
    assert!(!schema.matches_formula(text));
}

#[test]
fn matching_ignores_case_and_spacing() {
    let schema = schema();
    assert!(schema.matches_formula("Bob  Spence REALLY likes\n    plates with value 5"));
}

#[test]
fn every_character_prefix_scores_at_least_the_one_before() {
    let schema = schema();
    let template = &schema.templates()[0];
    for full in [
        COMPLETE,
        "bob roberts really likes plates with value 5",
        "bob reader really likes reels with value 5",
        "rita really likes wine with wit with value 5",
    ] {
        let mut previous = 0.0;
        for (end, _) in full.char_indices().skip(1) {
            let score = template.match_score(&full[..end]);
            assert!(
                score >= previous && score < 1.0,
                "{:?} scored {} after {}",
                &full[..end],
                score,
                previous
            );
            previous = score;
        }
        assert_eq!(template.match_score(full), 1.0);
    }
}
