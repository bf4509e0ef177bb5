//! Special commands parser for interactive chat mode
//!
//! Special commands manage the pending attachments and show session state
//! instead of being sent to the model. Commands are prefixed with `/`;
//! command names are case-insensitive, arguments are kept as typed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// A quoted argument was never closed
    #[error("Unterminated quote in arguments to {0}")]
    UnterminatedQuote(String),
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Upload one batch of files into the pending buffer
    Attach(Vec<String>),

    /// List pending attachments
    ShowPending,

    /// Discard pending attachments
    DropPending,

    /// Print the display log
    History,

    /// Show session, model and pending counts
    Status,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a regular chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` input and
/// `CommandError::MissingArgument` for `/attach` without paths.
///
/// # Examples
///
/// ```
/// use chatdrop::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command(r#"/attach notes.txt "Q3 report.xlsx""#).unwrap();
/// assert_eq!(
///     cmd,
///     SpecialCommand::Attach(vec!["notes.txt".to_string(), "Q3 report.xlsx".to_string()])
/// );
///
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, args) = match trimmed.split_once(char::is_whitespace) {
        Some((name, args)) => (name.to_lowercase(), args.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/attach" | "/a" => {
            let paths = split_arguments(args).ok_or_else(|| {
                CommandError::UnterminatedQuote("/attach".to_string())
            })?;
            if paths.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/attach".to_string(),
                    usage: "/attach <path> [path...]".to_string(),
                });
            }
            Ok(SpecialCommand::Attach(paths))
        }
        "/pending" | "/files" => Ok(SpecialCommand::ShowPending),
        "/drop" | "/clear" => Ok(SpecialCommand::DropPending),
        "/history" => Ok(SpecialCommand::History),
        "/status" => Ok(SpecialCommand::Status),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Split arguments on whitespace, honoring double quotes
///
/// Returns `None` if a quote is left open.
fn split_arguments(args: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in args.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    parts.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return None;
    }
    if has_token {
        parts.push(current);
    }
    Some(parts)
}

/// Print help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
==========================================

ATTACHMENTS:
  /attach <path>... - Upload files (one batch, at most the configured limit)
  /a <path>...      - Shorthand for /attach
  /pending          - List files waiting for the next message
  /drop             - Discard pending files

SESSION INFORMATION:
  /history          - Show the conversation so far
  /status           - Show session, model and pending file counts
  /help             - Show this help message
  /?                - Same as /help

SESSION CONTROL:
  /exit             - Exit interactive mode
  exit, quit        - Same as /exit

NOTES:
  - Pending files are sent with your next message, then cleared
  - Press Enter on an empty line to send pending files on their own
  - Quote paths that contain spaces: /attach "my notes.txt"
"#
    );
}
