//! Exclusive repository lock.
//!
//! Mutating operations read, modify and rewrite the branch table and HEAD.
//! Two processes doing that at once can lose an update, so the repository
//! handle takes an OS-level lock on `.minigit/lock` around each mutation.
//! The lock is non-blocking and released on drop.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::storage::error::{StorageError, StorageResult};

/// An exclusive lock on the repository, held until dropped.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    file: File,
}

impl RepoLock {
    /// Try to take the lock at `path`.
    ///
    /// Fails with [`StorageError::Locked`] if another process holds it.
    pub fn acquire(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::trace!(path = %path.display(), "acquired repository lock");
                Ok(Self {
                    path: path.to_path_buf(),
                    file,
                })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(StorageError::Locked(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release repository lock");
        }
    }
}
