//! Command line tokenizing.
//!
//! One command per line, whitespace-separated, first token is the command.
//! Commands taking a single argument require exactly one; anything that
//! doesn't fit is an unknown command.

use crate::shell::error::{ShellError, ShellResult};

/// Usage summary printed for unknown input.
pub const USAGE: &str = "Commands: init | add <file> | commit <msg> | log | \
checkout <branch/commit> | branch <name> | merge <branch> | status | exit";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    Add(String),
    /// message tokens joined by single spaces
    Commit(String),
    Log,
    Checkout(String),
    Branch(String),
    Merge(String),
    Status,
    Exit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> ShellResult<Option<Command>> {
        let tokens = tokenize(line);
        let Some((&name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match (name, args) {
            ("init", _) => Command::Init,
            ("log", _) => Command::Log,
            ("status", _) => Command::Status,
            ("exit" | "quit", _) => Command::Exit,
            ("add", [file]) => Command::Add(file.to_string()),
            ("checkout", [target]) => Command::Checkout(target.to_string()),
            ("branch", [branch]) => Command::Branch(branch.to_string()),
            ("merge", [branch]) => Command::Merge(branch.to_string()),
            ("commit", message) if !message.is_empty() => Command::Commit(message.join(" ")),
            _ => return Err(ShellError::UnknownCommand(line.trim().to_string())),
        };

        Ok(Some(command))
    }
}

/// split a line into whitespace-separated tokens
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
