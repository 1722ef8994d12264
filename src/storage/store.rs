//! On-disk repository layout.
//!
//! ```text
//! <work_dir>/.minigit/
//!     commits.txt     append-only `id|message|timestamp` lines
//!     branches.txt    `name|commit_id` lines, sorted by name, rewritten whole
//!     HEAD            one line: a branch name or a raw commit id
//!     config.json     per-repository settings
//!     lock            cross-process lock file
//!     staging/        files added since the last commit
//!     <commit_id>/    flat snapshot of one commit
//! ```
//!
//! Nothing is cached between calls: every read goes to disk, so a handle
//! always sees the state left by the previous command.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::storage::commit::CommitRecord;
use crate::storage::config::RepoSettings;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::refs::BranchTable;
use crate::storage::types::{CommitId, HeadRef};

/// Paths and primitive reads/writes of one repository.
#[derive(Debug, Clone)]
pub struct Store {
    work_dir: PathBuf,
    root: PathBuf,
}

impl Store {
    /// name of the marker directory
    pub const MARKER_DIR: &'static str = ".minigit";

    const COMMITS_FILE: &'static str = "commits.txt";
    const BRANCHES_FILE: &'static str = "branches.txt";
    const HEAD_FILE: &'static str = "HEAD";
    const CONFIG_FILE: &'static str = "config.json";
    const LOCK_FILE: &'static str = "lock";
    const STAGING_DIR: &'static str = "staging";

    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let root = work_dir.join(Self::MARKER_DIR);
        Self { work_dir, root }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn commits_path(&self) -> PathBuf {
        self.root.join(Self::COMMITS_FILE)
    }

    pub fn branches_path(&self) -> PathBuf {
        self.root.join(Self::BRANCHES_FILE)
    }

    pub fn head_path(&self) -> PathBuf {
        self.root.join(Self::HEAD_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(Self::CONFIG_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(Self::LOCK_FILE)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(Self::STAGING_DIR)
    }

    pub fn snapshot_dir(&self, id: &CommitId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn has_snapshot(&self, id: &CommitId) -> bool {
        self.snapshot_dir(id).is_dir()
    }

    /// check for the marker directory
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn ensure_initialized(&self) -> StorageResult<()> {
        if self.exists() {
            Ok(())
        } else {
            Err(StorageError::NotInitialized(self.work_dir.clone()))
        }
    }

    /// Create the marker directory, an empty commit log, a branch table
    /// holding an unborn `master`, and HEAD pointing at `master`.
    ///
    /// Existing state is never touched: a second call fails with
    /// [`StorageError::AlreadyInitialized`].
    pub fn initialize(&self, settings: &RepoSettings) -> StorageResult<()> {
        match fs::create_dir(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyInitialized)
            }
            Err(e) => return Err(e.into()),
        }

        fs::File::create(self.commits_path())?;
        self.save_branches(&BranchTable::initial())?;
        self.set_head(&HeadRef::master())?;
        self.save_settings(settings)?;

        tracing::info!(root = %self.root.display(), "initialized repository");
        Ok(())
    }

    // ==================== Branch Table ====================

    /// Read the branch table. A missing file is an empty table.
    pub fn load_branches(&self) -> StorageResult<BranchTable> {
        let path = self.branches_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BranchTable::new()),
            Err(e) => return Err(e.into()),
        };

        BranchTable::parse(&text).map_err(|reason| StorageError::CorruptedData { path, reason })
    }

    /// Overwrite the branch table with the given one.
    pub fn save_branches(&self, branches: &BranchTable) -> StorageResult<()> {
        self.write_atomic(&self.branches_path(), branches.to_text().as_bytes())?;
        tracing::debug!(branches = branches.len(), "saved branch table");
        Ok(())
    }

    // ==================== HEAD ====================

    /// Read HEAD. A missing or empty file reads as `master`.
    pub fn head(&self) -> StorageResult<HeadRef> {
        let text = match fs::read_to_string(self.head_path()) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HeadRef::master()),
            Err(e) => return Err(e.into()),
        };

        match text.lines().next() {
            Some(line) if !line.is_empty() => Ok(HeadRef::new(line)),
            _ => Ok(HeadRef::master()),
        }
    }

    pub fn set_head(&self, head: &HeadRef) -> StorageResult<()> {
        self.write_atomic(&self.head_path(), head.as_str().as_bytes())?;
        tracing::debug!(head = %head, "updated HEAD");
        Ok(())
    }

    // ==================== Commit Log ====================

    /// Append one record to the commit log. Earlier lines are never rewritten.
    pub fn append_commit_record(&self, record: &CommitRecord) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.commits_path())?;
        writeln!(file, "{}", record.to_line())?;
        Ok(())
    }

    /// All commit records, oldest first.
    pub fn read_commit_records(&self) -> StorageResult<Vec<CommitRecord>> {
        let path = self.commits_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let record = CommitRecord::parse_line(line).map_err(|reason| {
                StorageError::CorruptedData {
                    path: path.clone(),
                    reason: format!("line {}: {}", number + 1, reason),
                }
            })?;
            records.push(record);
        }

        Ok(records)
    }

    // ==================== Settings ====================

    /// Read the repository settings, falling back to defaults if absent.
    pub fn load_settings(&self) -> StorageResult<RepoSettings> {
        match fs::read(self.config_path()) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RepoSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_settings(&self, settings: &RepoSettings) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(settings)?;
        self.write_atomic(&self.config_path(), &json)
    }

    /// Replace `path` through a temp file in the repository root.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(contents)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
