//! CLI command definitions

use clap::Parser;
use council_domain::ExportFormat;
use std::path::PathBuf;

/// CLI arguments for council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "Ask one question, hear several philosophical perspectives")]
#[command(long_about = r#"
Council asks a question of several philosophical perspectives through a
backend service, then synthesizes their answers into one conclusion.

A session runs in four steps:
1. Write and submit the question
2. Pick a perspective and generate its answer (repeat per perspective)
3. With two or more answers, synthesize a conclusion
4. Export the session as Markdown, plain text or HTML

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_BACKEND__BASE_URL)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/council/config.toml   Global config

Example:
  council --list
  council -p Stoicism -p Existentialism --conclude "What makes a life meaningful?"
  council -p Buddhism --export md --out answer.md "Is the self an illusion?"
  council --interactive
"#)]
pub struct Cli {
    /// The question to put to the council (starts the REPL when omitted)
    pub question: Option<String>,

    /// Perspectives to answer from, in order (can be specified multiple times)
    #[arg(short, long, value_name = "PERSPECTIVE")]
    pub perspective: Vec<String>,

    /// Provider identifier (local, openrouter, ...)
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model to generate with
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Synthesize a conclusion once every perspective has answered
    #[arg(long)]
    pub conclude: bool,

    /// Export the session (md, txt, html)
    #[arg(short, long, value_name = "FORMAT")]
    pub export: Option<ExportFormat>,

    /// Export destination file or directory (default: the export filename in
    /// the current directory); `-` writes to stdout
    #[arg(long, value_name = "PATH", requires = "export")]
    pub out: Option<PathBuf>,

    /// Escape HTML special characters in HTML exports
    #[arg(long)]
    pub escape_html: bool,

    /// Start the interactive REPL even when a question is given
    #[arg(short, long)]
    pub interactive: bool,

    /// List perspectives, providers and models, then exit
    #[arg(short, long)]
    pub list: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Backend base URL, overriding configuration
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Whether the export goes to stdout (`--out -`)
    pub fn export_to_stdout(&self) -> bool {
        self.out.as_ref().is_some_and(|path| path.as_os_str() == "-")
    }

    /// File or directory the export is saved to; `None` for stdout
    pub fn export_destination(&self) -> Option<PathBuf> {
        match &self.out {
            _ if self.export_to_stdout() => None,
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(".")),
        }
    }

    /// REPL unless a one-shot question or a listing was requested
    pub fn wants_repl(&self) -> bool {
        self.interactive || (self.question.is_none() && !self.list)
    }
}
