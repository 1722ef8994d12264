//! Shell errors.

use thiserror::Error;

use crate::shell::command::USAGE;
use crate::storage::StorageError;

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Shell errors.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// the line didn't match any command; reported as the usage summary
    #[error("{}", USAGE)]
    UnknownCommand(String),

    /// reading input or writing console output failed
    #[error("console i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// whether the loop must stop instead of reporting and continuing
    pub fn is_fatal(&self) -> bool {
        match self {
            ShellError::Storage(e) => e.is_fatal(),
            ShellError::UnknownCommand(_) => false,
            ShellError::Io(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_prints_usage() {
        let err = ShellError::UnknownCommand("frobnicate".into());
        assert_eq!(err.to_string(), USAGE);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_storage_passthrough() {
        let err = ShellError::from(StorageError::NothingToCommit);
        assert_eq!(err.to_string(), "No changes to commit.");
        assert!(!err.is_fatal());

        let err = ShellError::from(StorageError::Io(std::io::Error::other("boom")));
        assert!(err.is_fatal());
    }
}
