use std::path::Path;

use le_core::highlight::{SemanticToken, TOKEN_MODIFIERS, TOKEN_TYPES};

use crate::{read_document, OutputFormat};

pub(crate) fn cmd_tokens(file: &Path, output: OutputFormat, quiet: bool) {
    let text = read_document(file, output, quiet);
    let tokens = le_core::semantic_tokens(&text);

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&tokens)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for token in &tokens {
                println!("{}", describe(token));
            }
        }
    }
}

/// `line:character length kind[.modifier]`, zero-based as sent to editors.
fn describe(token: &SemanticToken) -> String {
    let kind = legend_name(TOKEN_TYPES, token.token_type);
    match token.token_modifier {
        Some(m) => format!(
            "{}:{} {} {}.{}",
            token.line,
            token.character,
            token.length,
            kind,
            legend_name(TOKEN_MODIFIERS, m)
        ),
        None => format!("{}:{} {} {}", token.line, token.character, token.length, kind),
    }
}

fn legend_name(legend: &[&str], index: u32) -> String {
    legend
        .get(index as usize)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("#{}", index))
}
