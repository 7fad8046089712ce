mod commands;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use le_core::AnalysisConfig;

use commands::{cmd_check, cmd_score, cmd_tokens, ScoreAgainst};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Logical English template checker and language server.
#[derive(Parser)]
#[command(name = "le", version, about = "Logical English template checker and language server")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file with analysis settings (e.g. maxNumberOfProblems = 100)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report diagnostics for a Logical English document
    Check {
        /// Path to the .le source file
        file: PathBuf,
    },

    /// Print the semantic tokens of a Logical English document
    Tokens {
        /// Path to the .le source file
        file: PathBuf,
    },

    /// Score how well each literal matches a template
    #[command(group(clap::ArgGroup::new("against").required(true).args(["template", "file"])))]
    Score {
        /// Template pattern, e.g. "*a person* really likes *an object*"
        #[arg(long)]
        template: Option<String>,
        /// Score against every template of this .le document instead
        #[arg(long)]
        file: Option<PathBuf>,
        /// Literal texts to score
        #[arg(required = true)]
        literals: Vec<String>,
    },

    /// Start the Language Server Protocol server over stdio
    Lsp,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Check { file } => {
            let config = load_config(cli.config.as_deref(), cli.output, cli.quiet);
            cmd_check(&file, &config, cli.output, cli.quiet);
        }
        Commands::Tokens { file } => {
            cmd_tokens(&file, cli.output, cli.quiet);
        }
        Commands::Score {
            template,
            file,
            literals,
        } => {
            let against = match (template.as_deref(), file.as_deref()) {
                (Some(pattern), _) => ScoreAgainst::Template(pattern),
                (None, Some(file)) => ScoreAgainst::Document(file),
                (None, None) => {
                    report_error("score needs --template or --file", cli.output, cli.quiet);
                    process::exit(1);
                }
            };
            cmd_score(against, &literals, cli.output, cli.quiet);
        }
        Commands::Lsp => {
            if let Err(e) = le_lsp::run() {
                eprintln!("LSP server error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Log to stderr, filtered by `LE_LOG` (default `warn`). Stdout is reserved
/// for command output and the LSP transport.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read analysis settings from `path`, or the defaults when none is given.
fn load_config(path: Option<&Path>, output: OutputFormat, quiet: bool) -> AnalysisConfig {
    let Some(path) = path else {
        return AnalysisConfig::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            report_error(
                &format!("error reading config '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };
    match toml::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            report_error(
                &format!("invalid config '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

/// Read a document, exiting with status 1 when it cannot be read.
pub(crate) fn read_document(file: &Path, output: OutputFormat, quiet: bool) -> String {
    match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            report_error(
                &format!("error reading '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
