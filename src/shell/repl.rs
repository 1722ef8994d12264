//! Interactive REPL (Read-Eval-Print Loop) for minigit.

use std::io::{self, BufRead, Write};

use super::error::ShellResult;
use super::session::{Outcome, Session};

/// REPL configuration.
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string.
    pub prompt: String,
    /// Print the banner on start.
    pub banner: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "minigit> ".into(),
            banner: true,
        }
    }
}

/// The interactive REPL.
pub struct Repl {
    session: Session,
    config: ReplConfig,
    history: Vec<String>,
}

impl Repl {
    /// Create a new REPL over the given session.
    pub fn new(session: Session) -> Self {
        Self::with_config(session, ReplConfig::default())
    }

    /// Create a REPL with custom configuration.
    pub fn with_config(session: Session, config: ReplConfig) -> Self {
        Self {
            session,
            config,
            history: Vec::new(),
        }
    }

    /// Lines entered so far, blank lines excluded.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Run the REPL on stdin/stdout.
    pub fn run(&mut self) -> ShellResult<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the REPL until `exit` or end of input.
    ///
    /// Reported conditions are printed and the loop continues; only fatal
    /// errors end it early.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> ShellResult<()> {
        if self.config.banner {
            writeln!(output, "MiniGit (Branches & Merge)")?;
        }

        loop {
            write!(output, "{}", self.config.prompt)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF.
                writeln!(output)?;
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.history.push(line.to_string());

            match self.session.execute(line) {
                Ok(Some(Outcome::Exit)) => break,
                Ok(Some(outcome)) => {
                    if !outcome.is_silent() {
                        writeln!(output, "{}", outcome)?;
                    }
                }
                Ok(None) => {}
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "fatal error, leaving shell");
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!(error = ?e, "command failed");
                    writeln!(output, "{}", e)?;
                }
            }
        }

        Ok(())
    }
}
