use std::path::Path;
use std::process;

use le_core::{AnalysisConfig, Severity};

use crate::{read_document, OutputFormat};

/// Print the diagnostics of one document. Exits with status 1 when any of
/// them is an error.
pub(crate) fn cmd_check(file: &Path, config: &AnalysisConfig, output: OutputFormat, quiet: bool) {
    let text = read_document(file, output, quiet);
    let diagnostics = le_core::diagnostics(&text, config);
    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&diagnostics)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for diag in &diagnostics {
                let level = match diag.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                // Positions are printed one-based, like compiler output.
                println!(
                    "{}:{}:{}: {}: {}",
                    file.display(),
                    diag.span.start.line + 1,
                    diag.span.start.character + 1,
                    level,
                    diag.message
                );
            }
            if !quiet {
                match diagnostics.len() {
                    0 => println!("{}: no problems found", file.display()),
                    1 => println!("1 problem"),
                    n => println!("{} problems", n),
                }
            }
        }
    }

    if has_errors {
        process::exit(1);
    }
}
