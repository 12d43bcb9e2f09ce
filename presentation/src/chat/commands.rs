//! Slash-command parsing for the session REPL

use council_domain::ExportFormat;
use std::path::PathBuf;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Perspectives,
    Providers,
    Models,
    /// Select a perspective by name or 1-based index
    Use(String),
    Provider(String),
    Model(String),
    /// Generate an answer, optionally selecting a perspective first
    Ask(Option<String>),
    Tab(String),
    Remove(String),
    Conclude,
    Show,
    Detail,
    Export {
        format: Option<ExportFormat>,
        path: Option<PathBuf>,
    },
    Dismiss,
    Retry,
    Reset,
    Status,
    Quit,
    /// Fill the draft with a random example question
    Example,
    /// Submit the current draft
    Submit,
    /// Plain text: becomes the question
    Question(String),
}

/// Why a line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    MissingArgument { command: &'static str, argument: &'static str },
    InvalidArgument(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Unknown(cmd) => write!(f, "Unknown command: {}", cmd),
            ParseError::MissingArgument { command, argument } => {
                write!(f, "Usage: {} <{}>", command, argument)
            }
            ParseError::InvalidArgument(message) => write!(f, "{}", message),
        }
    }
}

impl ReplCommand {
    /// Parse a trimmed, non-empty line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(ReplCommand::Question(line.to_string()));
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };
        let argument = (!argument.is_empty()).then(|| argument.to_string());

        let required = |command: &'static str, arg: &'static str| {
            argument.clone().ok_or(ParseError::MissingArgument {
                command,
                argument: arg,
            })
        };

        match name {
            "help" | "h" | "?" => Ok(ReplCommand::Help),
            "perspectives" | "p" => Ok(ReplCommand::Perspectives),
            "providers" => Ok(ReplCommand::Providers),
            "models" => Ok(ReplCommand::Models),
            "use" => required("/use", "perspective").map(ReplCommand::Use),
            "provider" => required("/provider", "id").map(ReplCommand::Provider),
            "model" => required("/model", "id").map(ReplCommand::Model),
            "ask" | "generate" | "g" => Ok(ReplCommand::Ask(argument.clone())),
            "tab" => required("/tab", "perspective").map(ReplCommand::Tab),
            "remove" | "rm" => required("/remove", "perspective").map(ReplCommand::Remove),
            "conclude" | "synthesize" => Ok(ReplCommand::Conclude),
            "example" => Ok(ReplCommand::Example),
            "submit" => Ok(ReplCommand::Submit),
            "show" => Ok(ReplCommand::Show),
            "detail" => Ok(ReplCommand::Detail),
            "export" => Self::parse_export(argument.as_deref()),
            "dismiss" => Ok(ReplCommand::Dismiss),
            "retry" => Ok(ReplCommand::Retry),
            "reset" | "new" => Ok(ReplCommand::Reset),
            "status" => Ok(ReplCommand::Status),
            "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
            _ => Err(ParseError::Unknown(format!("/{}", name))),
        }
    }

    fn parse_export(argument: Option<&str>) -> Result<Self, ParseError> {
        let mut words = argument.unwrap_or("").split_whitespace();
        let format = match words.next() {
            Some(word) => Some(
                word.parse::<ExportFormat>()
                    .map_err(|e| ParseError::InvalidArgument(e.to_string()))?,
            ),
            None => None,
        };
        let path = words.next().map(PathBuf::from);
        Ok(ReplCommand::Export { format, path })
    }

    pub fn help_text() -> &'static str {
        "Commands:
  <text>                   Set and submit the question
  /example                 Draft a random example question
  /submit                  Submit the drafted question
  /perspectives, /p        List perspectives
  /providers               List providers and availability
  /models                  List models of the selected provider
  /use <perspective>       Select a perspective (name or number)
  /provider <id>           Select a provider
  /model <id>              Select a model
  /ask [perspective]       Generate an answer (alias /generate, /g)
  /tab <perspective>       Show one answer
  /remove <perspective>    Remove an answer
  /conclude                Synthesize a conclusion (needs two answers)
  /show                    Show the whole session
  /detail                  Toggle the full question text
  /export [md|txt|html] [path]  Export the session (default ./<filename>, - for stdout)
  /dismiss                 Clear the current error
  /retry                   Re-issue the failed request
  /reset, /new             Ask another question
  /status                  Show selection and progress
  /help, /h, /?            Show this help
  /quit, /exit, /q         Exit"
    }
}
