//! Interactive session module
//!
//! Provides a line-editor driven REPL over one council session.

pub mod commands;
mod repl;

pub use commands::{ParseError, ReplCommand};
pub use repl::SessionRepl;
