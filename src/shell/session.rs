//! Command execution against a repository.

use std::fmt;

use crate::shell::command::Command;
use crate::shell::error::ShellResult;
use crate::storage::{
    CheckoutOutcome, CommitId, CommitOutcome, CommitRecord, MergeOutcome, Repository, Status,
};

/// What a command produced, rendered as the console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Initialized,
    Added { path: String },
    Committed(CommitOutcome),
    /// newest first
    Log(Vec<CommitRecord>),
    CheckedOut(CheckoutOutcome),
    BranchCreated { name: String, at: Option<CommitId> },
    Merged(MergeOutcome),
    Status(Status),
    Exit,
}

impl Outcome {
    /// true if rendering produces no output
    pub fn is_silent(&self) -> bool {
        match self {
            Outcome::Log(records) => records.is_empty(),
            Outcome::Exit => true,
            _ => false,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Initialized => write!(f, "Initialized empty MiniGit repository."),
            Outcome::Added { path } => write!(f, "Added {} to staging area.", path),
            Outcome::Committed(outcome) => write!(
                f,
                "Committed as {}: {}",
                outcome.record.id, outcome.record.message
            ),
            Outcome::Log(records) => {
                for (i, record) in records.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "Commit {} - {}\n    {}",
                        record.id,
                        record.ctime(),
                        record.message
                    )?;
                }
                Ok(())
            }
            Outcome::CheckedOut(outcome) => write!(f, "Checked out {}", outcome.target),
            Outcome::BranchCreated { name, at } => write!(
                f,
                "Created branch {} at {}",
                name,
                at.as_ref().map(CommitId::as_str).unwrap_or("")
            ),
            Outcome::Merged(outcome) => {
                write!(f, "Merged branch {} into current branch.", outcome.branch)
            }
            Outcome::Status(status) => write!(f, "{}", status),
            Outcome::Exit => Ok(()),
        }
    }
}

/// Executes shell commands against one repository handle.
pub struct Session {
    repo: Repository,
}

impl Session {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Parse and run one input line. Blank lines yield `None`.
    pub fn execute(&mut self, line: &str) -> ShellResult<Option<Outcome>> {
        match Command::parse(line)? {
            Some(command) => self.run(command).map(Some),
            None => Ok(None),
        }
    }

    /// Run a parsed command.
    pub fn run(&mut self, command: Command) -> ShellResult<Outcome> {
        tracing::debug!(?command, "running command");

        let outcome = match command {
            Command::Init => {
                self.repo.init()?;
                Outcome::Initialized
            }
            Command::Add(path) => {
                self.repo.add(&path)?;
                Outcome::Added { path }
            }
            Command::Commit(message) => Outcome::Committed(self.repo.commit(&message)?),
            Command::Log => Outcome::Log(self.repo.log()?),
            Command::Checkout(target) => Outcome::CheckedOut(self.repo.checkout(&target)?),
            Command::Branch(name) => {
                let at = self.repo.create_branch(&name)?;
                Outcome::BranchCreated { name, at }
            }
            Command::Merge(branch) => Outcome::Merged(self.repo.merge(&branch)?),
            Command::Status => Outcome::Status(self.repo.status()?),
            Command::Exit => Outcome::Exit,
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::command::USAGE;
    use crate::shell::error::ShellError;
    use crate::storage::StorageError;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        let session = Session::new(Repository::open(dir.path()));
        (dir, session)
    }

    /// run a line and render what the console would show
    fn say(session: &mut Session, line: &str) -> String {
        match session.execute(line) {
            Ok(Some(outcome)) => outcome.to_string(),
            Ok(None) => String::new(),
            Err(e) => e.to_string(),
        }
    }

    fn write(session: &Session, name: &str, content: &str) {
        fs::write(session.repository().work_dir().join(name), content).unwrap();
    }

    fn read(session: &Session, name: &str) -> String {
        fs::read_to_string(session.repository().work_dir().join(name)).unwrap()
    }

    #[test]
    fn test_console_messages() {
        let (_dir, mut s) = setup();

        assert_eq!(say(&mut s, "init"), "Initialized empty MiniGit repository.");
        assert_eq!(say(&mut s, "init"), "Repository already exists.");
        assert_eq!(say(&mut s, "add missing.txt"), "File does not exist.");
        assert_eq!(say(&mut s, "commit nothing staged"), "No changes to commit.");
        assert_eq!(say(&mut s, "log"), "");
        assert_eq!(say(&mut s, "checkout nowhere"), "Target not found.");
        assert_eq!(say(&mut s, "merge nowhere"), "Branch not found.");
        assert_eq!(say(&mut s, "merge master"), "Nothing to merge.");
        assert_eq!(say(&mut s, "branch dev"), "Created branch dev at ");
        assert_eq!(say(&mut s, "branch dev"), "Branch already exists.");
        assert_eq!(say(&mut s, "frobnicate"), USAGE);
        assert_eq!(say(&mut s, ""), "");
    }

    #[test]
    fn test_end_to_end() {
        let (_dir, mut s) = setup();
        say(&mut s, "init");

        write(&s, "f.txt", "A");
        assert_eq!(say(&mut s, "add f.txt"), "Added f.txt to staging area.");
        let committed = say(&mut s, "commit first");
        assert!(committed.starts_with("Committed as "));
        assert!(committed.ends_with(": first"));

        let log = say(&mut s, "log");
        assert_eq!(log.lines().count(), 2);
        assert!(log.starts_with("Commit "));
        assert!(log.ends_with("\n    first"));

        let master = s.repository().branches().unwrap().commit_of("master").cloned().unwrap();
        assert_eq!(say(&mut s, "branch dev"), format!("Created branch dev at {}", master));

        write(&s, "f.txt", "B");
        say(&mut s, "add f.txt");
        say(&mut s, "commit second");

        assert_eq!(say(&mut s, "checkout dev"), "Checked out dev");
        assert_eq!(read(&s, "f.txt"), "A");
        assert_eq!(s.repository().head().unwrap().as_str(), "dev");
    }

    #[test]
    fn test_merge_scenario() {
        let (_dir, mut s) = setup();
        say(&mut s, "init");

        write(&s, "x.txt", "x content");
        say(&mut s, "add x.txt");
        say(&mut s, "commit add x");
        say(&mut s, "branch other");
        say(&mut s, "checkout other");
        write(&s, "y.txt", "y content");
        say(&mut s, "add y.txt");
        say(&mut s, "commit add y");
        say(&mut s, "checkout master");
        fs::remove_file(s.repository().work_dir().join("y.txt")).unwrap();

        let branches = s.repository().branches().unwrap();
        assert_eq!(
            say(&mut s, "merge other"),
            "Merged branch other into current branch."
        );

        assert_eq!(read(&s, "x.txt"), "x content");
        assert_eq!(read(&s, "y.txt"), "y content");
        assert_eq!(s.repository().branches().unwrap(), branches);
        assert_eq!(s.repository().head().unwrap().as_str(), "master");
    }

    #[test]
    fn test_log_newest_first() {
        let (_dir, mut s) = setup();
        say(&mut s, "init");
        for (i, msg) in ["one", "two", "three"].iter().enumerate() {
            write(&s, "f.txt", &i.to_string());
            say(&mut s, "add f.txt");
            say(&mut s, &format!("commit {}", msg));
        }

        let log = say(&mut s, "log");
        let messages: Vec<&str> = log
            .lines()
            .filter_map(|l| l.strip_prefix("    "))
            .collect();
        assert_eq!(messages, vec!["three", "two", "one"]);
    }

    #[test]
    fn test_errors_are_typed() {
        let (_dir, mut s) = setup();
        let err = s.execute("add f.txt").unwrap_err();
        assert!(matches!(
            err,
            ShellError::Storage(StorageError::NotInitialized(_))
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_exit_is_silent() {
        let (_dir, mut s) = setup();
        let outcome = s.execute("exit").unwrap().unwrap();
        assert_eq!(outcome, Outcome::Exit);
        assert!(outcome.is_silent());
    }
}
