//! Materializing snapshots into the working directory.
//!
//! Both checkout and merge copy a snapshot's files over the working
//! directory root. Files the snapshot doesn't have are left alone, so
//! neither operation ever deletes anything; merge is last-write-wins with
//! no ancestor or conflict analysis.

use std::path::Path;

use crate::storage::commit::copy_tree;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::refs::RefManager;
use crate::storage::store::Store;
use crate::storage::types::{BranchName, CommitId, HeadRef};

/// Result of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// the target as given, now stored in HEAD
    pub target: String,
    pub commit: CommitId,
    pub files: usize,
    pub detached: bool,
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub branch: BranchName,
    pub commit: CommitId,
    pub files: usize,
}

/// Copy the snapshot of `id` over `work_dir`.
fn materialize(store: &Store, id: &CommitId, work_dir: &Path) -> StorageResult<usize> {
    let files = copy_tree(&store.snapshot_dir(id), work_dir)?;
    tracing::debug!(commit = %id, files, "materialized snapshot");
    Ok(files)
}

/// Check out a branch or commit.
///
/// HEAD is set to `target` verbatim: a branch name leaves HEAD attached to
/// that branch, a raw commit id detaches it.
pub fn checkout(store: &Store, target: &str) -> StorageResult<CheckoutOutcome> {
    let branches = store.load_branches()?;
    let commit = RefManager::resolve(&branches, target)
        .filter(|id| store.has_snapshot(id))
        .ok_or_else(|| StorageError::TargetNotFound(target.to_string()))?;

    let files = materialize(store, &commit, store.work_dir())?;
    store.set_head(&HeadRef::new(target))?;

    let detached = !branches.contains(target);
    tracing::info!(target, commit = %commit, detached, "checked out");
    Ok(CheckoutOutcome {
        target: target.to_string(),
        commit,
        files,
        detached,
    })
}

/// Overlay a branch's snapshot onto the working directory.
///
/// HEAD and every branch pointer stay where they are and no commit is
/// recorded.
pub fn merge(store: &Store, branch: &str) -> StorageResult<MergeOutcome> {
    let branches = store.load_branches()?;
    let name = branches
        .find(branch)
        .cloned()
        .ok_or_else(|| StorageError::BranchNotFound(branch.to_string()))?;

    let commit = branches
        .commit_of(branch)
        .filter(|id| store.has_snapshot(id))
        .cloned()
        .ok_or_else(|| StorageError::NothingToMerge(branch.to_string()))?;

    let files = materialize(store, &commit, store.work_dir())?;

    tracing::info!(branch, commit = %commit, files, "merged branch into working directory");
    Ok(MergeOutcome {
        branch: name,
        commit,
        files,
    })
}
