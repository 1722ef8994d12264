//! Commit records and the staging-to-snapshot transition.
//!
//! A commit is the staged set of files copied into `.minigit/<id>/` plus
//! one `id|message|timestamp` line in the commit log. Files from earlier
//! commits are not carried forward: each snapshot holds exactly what was
//! staged.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, SubsecRound, TimeZone, Utc};
use walkdir::WalkDir;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::hash::Hasher;
use crate::storage::refs::RefManager;
use crate::storage::staging::StagingArea;
use crate::storage::store::Store;
use crate::storage::types::{BranchName, CommitId, IdWidth};

/// One entry of the commit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: CommitId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitRecord {
    pub fn new(id: CommitId, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            message: message.into(),
            timestamp,
        }
    }

    /// serialize as a commit log line (without the newline)
    pub fn to_line(&self) -> String {
        format!("{}|{}|{}", self.id, self.message, self.timestamp.timestamp())
    }

    /// Parse a commit log line.
    ///
    /// The id runs to the first `|` and the timestamp follows the last one,
    /// so a message may itself contain `|`.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let (id, rest) = line
            .split_once('|')
            .ok_or_else(|| "missing field delimiter".to_string())?;
        let (message, seconds) = rest
            .rsplit_once('|')
            .ok_or_else(|| "missing timestamp".to_string())?;

        let id = CommitId::from_hex(id).map_err(|e| format!("bad commit id: {}", e))?;
        let seconds: i64 = seconds
            .trim()
            .parse()
            .map_err(|e| format!("bad timestamp {:?}: {}", seconds, e))?;
        let timestamp = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {}", seconds))?;

        Ok(Self::new(id, message, timestamp))
    }

    /// the timestamp in local time, `ctime` style: `Thu Nov 14 22:13:20 2023`
    pub fn ctime(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%a %b %e %H:%M:%S %Y")
            .to_string()
    }
}

/// What a successful commit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub record: CommitRecord,
    /// the branch that now points at the commit, `None` with a detached HEAD
    pub branch: Option<BranchName>,
}

/// Derive the id for a commit of the current staging area.
///
/// The input is `message + decimal seconds`. With [`IdWidth::Full`] the
/// staged file names and bytes are appended in name order.
pub fn commit_id_for(
    staging: &StagingArea,
    message: &str,
    timestamp: DateTime<Utc>,
    width: IdWidth,
) -> StorageResult<CommitId> {
    let mut hasher = Hasher::new();
    hasher
        .update(message.as_bytes())
        .update(timestamp.timestamp().to_string().as_bytes());

    if width.mixes_content() {
        for name in staging.files()? {
            let bytes = fs::read(staging.dir().join(&name))?;
            hasher.update(name.as_bytes()).update(&bytes);
        }
    }

    Ok(hasher.finish_id(width))
}

/// Turn the staging area into a new commit.
///
/// Fails with [`StorageError::NothingToCommit`] if nothing is staged, in
/// which case nothing is written. An id that matches an existing snapshot
/// is overwritten file by file. Sub-second precision of `timestamp` is
/// dropped, as the log only holds whole seconds.
pub fn create_commit(
    store: &Store,
    message: &str,
    timestamp: DateTime<Utc>,
    width: IdWidth,
) -> StorageResult<CommitOutcome> {
    let staging = StagingArea::new(store.staging_dir());
    if staging.is_empty()? {
        return Err(StorageError::NothingToCommit);
    }

    let timestamp = timestamp.trunc_subsecs(0);
    let id = commit_id_for(&staging, message, timestamp, width)?;
    write_snapshot(store, staging.dir(), &id)?;
    staging.clear()?;

    let record = CommitRecord::new(id.clone(), message, timestamp);
    store.append_commit_record(&record)?;

    let branch = RefManager::advance_head(store, &id)?;

    tracing::info!(commit = %id, branch = ?branch.as_ref().map(BranchName::as_str), "created commit");
    Ok(CommitOutcome { record, branch })
}

/// Write the snapshot for `id`.
///
/// A new id is copied into a temp directory inside the repository and
/// moved into place. An id that already has a snapshot gets the staged
/// files copied over it, so files it held that weren't staged again stay.
fn write_snapshot(store: &Store, source: &Path, id: &CommitId) -> StorageResult<()> {
    let dest = store.snapshot_dir(id);
    if dest.exists() {
        tracing::warn!(commit = %id, "commit id collision, overwriting earlier snapshot");
        copy_tree(source, &dest)?;
        return Ok(());
    }

    let tmp = tempfile::Builder::new()
        .prefix(".snapshot-")
        .tempdir_in(store.root())?;
    copy_tree(source, tmp.path())?;
    fs::rename(tmp.path(), &dest)?;

    Ok(())
}

/// Recursively copy the contents of `source` into `dest`, overwriting
/// same-named files. Returns the number of files copied.
pub(crate) fn copy_tree(source: &Path, dest: &Path) -> StorageResult<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            StorageError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop while copying")),
            )
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| StorageError::CorruptedData {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}
