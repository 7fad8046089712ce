//! Semantic token provider for template-aware highlighting.
//!
//! Runs the core analysis and converts its absolute-position tokens into
//! the delta-encoded LSP form. Best-effort: a document whose schema fails
//! to build still highlights its control comments.

use le_core::highlight;
use lsp_types::{SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend};

/// Legend registered with the client, in the core's index order.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: highlight::TOKEN_TYPES
            .iter()
            .copied()
            .map(SemanticTokenType::new)
            .collect(),
        token_modifiers: highlight::TOKEN_MODIFIERS
            .iter()
            .copied()
            .map(SemanticTokenModifier::new)
            .collect(),
    }
}

/// Modifier index as the LSP bitset; no modifier is the empty set.
pub fn modifier_bitset(index: Option<u32>) -> u32 {
    match index {
        Some(i) if i < u32::BITS => 1 << i,
        _ => 0,
    }
}

/// Compute delta-encoded semantic tokens for the given content.
pub fn compute_semantic_tokens(content: &str) -> Vec<SemanticToken> {
    let mut raw = le_core::semantic_tokens(content);
    raw.sort_by(|a, b| a.line.cmp(&b.line).then(a.character.cmp(&b.character)));
    delta_encode(&raw)
}

/// Delta-encode sorted tokens into LSP SemanticToken format.
fn delta_encode(raw: &[highlight::SemanticToken]) -> Vec<SemanticToken> {
    let mut result = Vec::with_capacity(raw.len());
    let mut prev_line: u32 = 0;
    let mut prev_col: u32 = 0;

    for tok in raw {
        let delta_line = tok.line - prev_line;
        let delta_start = if delta_line == 0 {
            tok.character - prev_col
        } else {
            tok.character
        };

        result.push(SemanticToken {
            delta_line,
            delta_start,
            length: tok.length,
            token_type: tok.token_type,
            token_modifiers_bitset: modifier_bitset(tok.token_modifier),
        });

        prev_line = tok.line;
        prev_col = tok.character;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_follows_core_order() {
        let legend = legend();
        let types: Vec<&str> = legend.token_types.iter().map(|t| t.as_str()).collect();
        assert_eq!(types, vec!["variable", "class", "interface", "keyword"]);
        assert_eq!(legend.token_modifiers[2].as_str(), "control");
    }

    #[test]
    fn modifier_indices_become_bits() {
        assert_eq!(modifier_bitset(None), 0);
        assert_eq!(modifier_bitset(Some(0)), 1);
        assert_eq!(modifier_bitset(Some(2)), 4);
        assert_eq!(modifier_bitset(Some(40)), 0);
    }

    #[test]
    fn tokens_are_delta_encoded_from_document_start() {
        let text = "\
%type checking on
the templates are:
*a person* is happy.

scenario one is:
bob is happy.
";
        let tokens = compute_semantic_tokens(text);
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            (tokens[0].delta_line, tokens[0].delta_start, tokens[0].length),
            (0, 0, 17)
        );
        assert_eq!(tokens[0].token_modifiers_bitset, 4);
        assert_eq!(
            (tokens[1].delta_line, tokens[1].delta_start, tokens[1].length),
            (5, 0, 3)
        );
        assert_eq!(tokens[1].token_type, 0);
        assert_eq!(tokens[1].token_modifiers_bitset, 0);
    }
}
