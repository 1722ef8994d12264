//! Storage layer error types
//!
//! Every condition the core can report is defined here. The user-facing
//! variants render as the single console line the shell prints; only the
//! I/O and corruption variants are fatal.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::InvalidNameError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// `init` on a directory that already has a repository
    #[error("Repository already exists.")]
    AlreadyInitialized,

    /// repo is not initialized
    #[error("Not a minigit repository (run `init` first).")]
    NotInitialized(PathBuf),

    /// the file given to `add` does not exist
    #[error("File does not exist.")]
    FileNotFound(PathBuf),

    /// the path given to `add` is a directory or other non-file
    #[error("Not a regular file.")]
    NotAFile(PathBuf),

    /// staging area is empty or missing
    #[error("No changes to commit.")]
    NothingToCommit,

    /// checkout target resolves to no snapshot
    #[error("Target not found.")]
    TargetNotFound(String),

    /// branch already exists
    #[error("Branch already exists.")]
    BranchAlreadyExists(String),

    /// the branch to merge is not in the branch table
    #[error("Branch not found.")]
    BranchNotFound(String),

    /// the branch to merge has no snapshot (unborn)
    #[error("Nothing to merge.")]
    NothingToMerge(String),

    /// invalid branch name
    #[error("Invalid branch name: {0}")]
    InvalidName(#[from] InvalidNameError),

    /// another process holds the repository lock
    #[error("Repository is locked by another process.")]
    Locked(PathBuf),

    /// a persisted file could not be parsed
    #[error("corrupted data at {path}: {reason}")]
    CorruptedData { path: PathBuf, reason: String },

    /// the repository config file could not be read or written
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if the repository itself is unusable
    ///
    /// Everything else is reported and the shell keeps going.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StorageError::Io(_) | StorageError::CorruptedData { .. } | StorageError::Config(_)
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
