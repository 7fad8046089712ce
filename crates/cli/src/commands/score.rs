use std::path::Path;
use std::process;

use le_core::{Schema, SchemaError};
use serde::Serialize;

use crate::{read_document, report_error, OutputFormat};

/// What the literals are scored against.
pub(crate) enum ScoreAgainst<'a> {
    /// A single template pattern given on the command line.
    Template(&'a str),
    /// Every template declared in a document, keeping the best per literal.
    Document(&'a Path),
}

#[derive(Serialize)]
struct LiteralScore<'a> {
    literal: &'a str,
    score: f64,
    matches: bool,
    template: Option<&'a str>,
}

/// Score each literal against the templates of `against`. In text mode a
/// summary line follows the scores unless `quiet` is set.
pub(crate) fn cmd_score(against: ScoreAgainst<'_>, literals: &[String], output: OutputFormat, quiet: bool) {
    let schema = match build_schema(&against, output, quiet) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    if schema.templates().is_empty() {
        report_error("no template to score against", output, quiet);
        process::exit(1);
    }

    let scores: Vec<LiteralScore<'_>> = literals
        .iter()
        .map(|literal| {
            let best = schema.best_match(literal);
            LiteralScore {
                literal,
                score: best.map_or(0.0, |(_, score)| score),
                matches: schema.matches_formula(literal),
                template: best.map(|(template, _)| template.source()),
            }
        })
        .collect();

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&scores)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for s in &scores {
                match (&against, s.template) {
                    (ScoreAgainst::Document(_), Some(template)) => {
                        println!("{:.3}\t{}\t{}", s.score, s.literal, template)
                    }
                    _ => println!("{:.3}\t{}", s.score, s.literal),
                }
            }
            if !quiet {
                let matched = scores.iter().filter(|s| s.matches).count();
                println!("{} of {} literals match", matched, scores.len());
            }
        }
    }
}

fn build_schema(against: &ScoreAgainst<'_>, output: OutputFormat, quiet: bool) -> Result<Schema, SchemaError> {
    match against {
        ScoreAgainst::Template(pattern) => Schema::from_patterns(&[*pattern]),
        ScoreAgainst::Document(file) => {
            let text = read_document(file, output, quiet);
            let segments = le_core::segment(&le_core::strip_comments(&text));
            Schema::build(&segments.templates, &segments.type_declarations)
        }
    }
}
