//! The command shell.
//!
//! A thin layer over [`crate::storage::Repository`]: it tokenizes input
//! lines, runs them, and prints one line per reported condition.

mod command;
mod error;
mod repl;
mod session;

pub use command::{tokenize, Command, USAGE};
pub use error::{ShellError, ShellResult};
pub use repl::{Repl, ReplConfig};
pub use session::{Outcome, Session};
