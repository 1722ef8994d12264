//! The repository handle.
//!
//! Every operation goes through a [`Repository`] built once from a working
//! directory. It holds no repository state of its own beyond paths and
//! config: branch table, HEAD and the commit log are read from disk on each
//! call.
//!
//! Mutations are serialized twice: an in-process mutex for clones of the
//! same handle shared across threads, and [`RepoLock`] against other
//! processes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::storage::checkout::{self, CheckoutOutcome, MergeOutcome};
use crate::storage::commit::{self, CommitOutcome, CommitRecord};
use crate::storage::config::RepositoryConfig;
use crate::storage::error::StorageResult;
use crate::storage::lock::RepoLock;
use crate::storage::refs::{BranchTable, RefManager};
use crate::storage::staging::StagingArea;
use crate::storage::store::Store;
use crate::storage::types::{BranchName, CommitId, HeadRef, HeadState, IdWidth};

/// The main repository handle.
///
/// Clone this to share across threads - it uses Arc internally.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    store: Store,
    config: RepositoryConfig,
    write_lock: Mutex<()>,
}

impl Repository {
    /// Open a handle on `work_dir` with default configuration.
    ///
    /// The directory need not be initialized yet; see [`Repository::init`].
    pub fn open(work_dir: impl AsRef<Path>) -> Self {
        Self::with_config(RepositoryConfig::new(work_dir.as_ref()))
    }

    /// Open a handle with custom configuration.
    pub fn with_config(config: RepositoryConfig) -> Self {
        Self {
            inner: Arc::new(RepositoryInner {
                store: Store::new(config.work_dir.clone()),
                config,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Get the working directory path.
    pub fn work_dir(&self) -> &Path {
        self.inner.store.work_dir()
    }

    /// Get the on-disk layout.
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.store.exists()
    }

    /// Execute a read-only function against an initialized repository.
    fn with_store<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Store) -> StorageResult<T>,
    {
        let store = &self.inner.store;
        store.ensure_initialized()?;
        f(store)
    }

    /// Execute a mutating function while holding both locks.
    fn with_store_mut<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Store) -> StorageResult<T>,
    {
        let _guard = self.inner.write_lock.lock();
        let store = &self.inner.store;
        store.ensure_initialized()?;

        let _lock = if self.inner.config.locking {
            Some(RepoLock::acquire(&store.lock_path())?)
        } else {
            None
        };

        f(store)
    }

    /// The id scheme in effect: the persisted one, else the configured one.
    fn id_width(&self, store: &Store) -> StorageResult<IdWidth> {
        if store.config_path().exists() {
            Ok(store.load_settings()?.id_width)
        } else {
            Ok(self.inner.config.id_width)
        }
    }

    // ==================== Commands ====================

    /// Initialize the repository.
    pub fn init(&self) -> StorageResult<()> {
        let _guard = self.inner.write_lock.lock();
        self.inner
            .store
            .initialize(&self.inner.config.initial_settings())
    }

    /// Stage a file. Relative paths are taken from the working directory.
    ///
    /// Returns the name the file was staged under.
    pub fn add(&self, path: impl AsRef<Path>) -> StorageResult<String> {
        let source = self.resolve_path(path.as_ref());
        self.with_store_mut(|store| StagingArea::new(store.staging_dir()).stage(&source))
    }

    /// Commit the staging area at the current time.
    pub fn commit(&self, message: &str) -> StorageResult<CommitOutcome> {
        self.commit_at(message, Utc::now())
    }

    /// Commit the staging area with an explicit timestamp.
    ///
    /// Only whole seconds are recorded.
    pub fn commit_at(&self, message: &str, timestamp: DateTime<Utc>) -> StorageResult<CommitOutcome> {
        self.with_store_mut(|store| {
            let width = self.id_width(store)?;
            commit::create_commit(store, message, timestamp, width)
        })
    }

    /// Commit records, newest first.
    pub fn log(&self) -> StorageResult<Vec<CommitRecord>> {
        self.with_store(|store| {
            let mut records = store.read_commit_records()?;
            records.reverse();
            Ok(records)
        })
    }

    /// Check out a branch or commit into the working directory.
    pub fn checkout(&self, target: &str) -> StorageResult<CheckoutOutcome> {
        self.with_store_mut(|store| checkout::checkout(store, target))
    }

    /// Create a branch at the current branch's commit.
    pub fn create_branch(&self, name: &str) -> StorageResult<Option<CommitId>> {
        let name = BranchName::new(name)?;
        self.with_store_mut(|store| RefManager::create_branch(store, &name))
    }

    /// Overlay a branch's snapshot onto the working directory.
    pub fn merge(&self, branch: &str) -> StorageResult<MergeOutcome> {
        self.with_store_mut(|store| checkout::merge(store, branch))
    }

    // ==================== Queries ====================

    /// Get the raw HEAD value.
    pub fn head(&self) -> StorageResult<HeadRef> {
        self.with_store(|store| store.head())
    }

    /// Get the branch table.
    pub fn branches(&self) -> StorageResult<BranchTable> {
        self.with_store(|store| store.load_branches())
    }

    /// HEAD state, current commit and staged files.
    pub fn status(&self) -> StorageResult<Status> {
        self.with_store(|store| {
            let branches = store.load_branches()?;
            let head = store.head()?.state(&branches);
            let commit = match &head {
                HeadState::Attached(branch) => branches.commit_of(branch.as_str()).cloned(),
                HeadState::Detached(raw) => CommitId::from_hex(raw)
                    .ok()
                    .filter(|id| store.has_snapshot(id)),
            };
            let staged = StagingArea::new(store.staging_dir()).files()?;

            Ok(Status {
                head,
                commit,
                staged,
            })
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir().join(path)
        }
    }
}

/// Snapshot of where the repository stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub head: HeadState,
    /// commit HEAD designates, `None` when unborn
    pub commit: Option<CommitId>,
    /// staged file names, sorted
    pub staged: Vec<String>,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.head {
            HeadState::Attached(branch) => write!(f, "On branch {}", branch)?,
            HeadState::Detached(raw) => write!(f, "HEAD detached at {}", raw)?,
        }
        match &self.commit {
            Some(id) => writeln!(f, " ({})", id)?,
            None => writeln!(f, " (no commits yet)")?,
        }

        if self.staged.is_empty() {
            write!(f, "Nothing staged.")
        } else {
            write!(f, "Staged files:")?;
            for name in &self.staged {
                write!(f, "\n    {}", name)?;
            }
            Ok(())
        }
    }
}
