//! Presentation layer for council
//!
//! This crate contains CLI definitions, console and export formatters,
//! progress reporters, and the interactive session REPL.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ReplCommand, SessionRepl};
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use output::export::{ExportDocument, ExportRenderer};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
