//! Branch table and reference management.
//!
//! Branches are plain `name -> commit id` entries in `branches.txt`; an
//! unborn branch has an empty id. HEAD is resolved against this table on
//! every use, so there is no separate "attached" flag to keep in sync.

use std::collections::BTreeMap;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::store::Store;
use crate::storage::types::{BranchName, CommitId, HeadState};

/// Mapping from branch name to the commit it designates.
///
/// Iteration and serialization are in lexicographic name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchTable {
    entries: BTreeMap<BranchName, Option<CommitId>>,
}

impl BranchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// the table written by `init`: an unborn `master`
    pub fn initial() -> Self {
        let mut table = Self::new();
        table.set(BranchName::master(), None);
        table
    }

    /// Parse `name|commit_id` lines.
    ///
    /// Lines without a `|` are ignored. An empty id is an unborn branch.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut table = Self::new();

        for line in text.lines() {
            let Some((name, id)) = line.split_once('|') else {
                continue;
            };

            let name = BranchName::new(name)
                .map_err(|e| format!("bad branch name {:?}: {}", name, e))?;
            let id = if id.is_empty() {
                None
            } else {
                Some(
                    CommitId::from_hex(id)
                        .map_err(|e| format!("bad commit id for branch {}: {}", name, e))?,
                )
            };

            table.entries.insert(name, id);
        }

        Ok(table)
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (name, id) in &self.entries {
            text.push_str(name.as_str());
            text.push('|');
            if let Some(id) = id {
                text.push_str(id.as_str());
            }
            text.push('\n');
        }
        text
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// the stored key for `name`, if it is a branch
    pub fn find(&self, name: &str) -> Option<&BranchName> {
        self.entries.get_key_value(name).map(|(key, _)| key)
    }

    /// commit a branch points to; `None` if missing or unborn
    pub fn commit_of(&self, name: &str) -> Option<&CommitId> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    /// point `name` at `id`, creating the entry if needed
    pub fn set(&mut self, name: BranchName, id: Option<CommitId>) {
        self.entries.insert(name, id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns HEAD and the branch table.
pub struct RefManager;

impl RefManager {
    /// Resolve a checkout target to a commit id.
    ///
    /// A branch name yields that branch's commit (`None` when unborn).
    /// Anything else is taken as a literal commit id, `None` if it isn't
    /// one. Whether a snapshot exists for the id is not checked here.
    pub fn resolve(branches: &BranchTable, target: &str) -> Option<CommitId> {
        if branches.contains(target) {
            return branches.commit_of(target).cloned();
        }
        CommitId::from_hex(target).ok()
    }

    /// Create a branch at the current branch's commit.
    ///
    /// Returns the commit the new branch points to.
    pub fn create_branch(store: &Store, name: &BranchName) -> StorageResult<Option<CommitId>> {
        let mut branches = store.load_branches()?;
        if branches.contains(name.as_str()) {
            return Err(StorageError::BranchAlreadyExists(name.to_string()));
        }

        let head = store.head()?;
        let at = branches.commit_of(head.as_str()).cloned();
        branches.set(name.clone(), at.clone());
        store.save_branches(&branches)?;

        tracing::info!(branch = %name, at = ?at.as_ref().map(CommitId::as_str), "created branch");
        Ok(at)
    }

    /// Move HEAD's branch to `id` if HEAD is attached.
    ///
    /// Returns the branch that moved. With a detached HEAD the table is left
    /// untouched and `None` is returned.
    pub fn advance_head(store: &Store, id: &CommitId) -> StorageResult<Option<BranchName>> {
        let mut branches = store.load_branches()?;
        let head = store.head()?;

        match head.state(&branches) {
            HeadState::Attached(branch) => {
                branches.set(branch.clone(), Some(id.clone()));
                store.save_branches(&branches)?;
                tracing::debug!(branch = %branch, commit = %id, "advanced branch");
                Ok(Some(branch))
            }
            HeadState::Detached(raw) => {
                tracing::debug!(head = %raw, commit = %id, "detached HEAD, no branch moved");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::RepoSettings;
    use crate::storage::types::HeadRef;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        store.initialize(&RepoSettings::default()).unwrap();
        (dir, store)
    }

    fn id(hex: &str) -> CommitId {
        CommitId::from_hex(hex).unwrap()
    }

    #[test]
    fn test_parse_skips_lines_without_delimiter() {
        let table = BranchTable::parse("master|abc1234\njunk\ndev|\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.commit_of("master"), Some(&id("abc1234")));
        assert!(table.contains("dev"));
        assert_eq!(table.commit_of("dev"), None);
    }

    #[test]
    fn test_parse_rejects_bad_id() {
        assert!(BranchTable::parse("master|not-hex\n").is_err());
    }

    #[test]
    fn test_resolve() {
        let table = BranchTable::parse("master|abc1234\ndev|\n").unwrap();

        assert_eq!(RefManager::resolve(&table, "master"), Some(id("abc1234")));
        assert_eq!(RefManager::resolve(&table, "dev"), None);
        assert_eq!(RefManager::resolve(&table, "def5678"), Some(id("def5678")));
        assert_eq!(RefManager::resolve(&table, "nosuchbranch"), None);
    }

    #[test]
    fn test_create_branch_copies_current_commit() {
        let (_dir, store) = setup();
        let mut branches = store.load_branches().unwrap();
        branches.set(BranchName::master(), Some(id("abc1234")));
        store.save_branches(&branches).unwrap();

        let dev = BranchName::new("dev").unwrap();
        let at = RefManager::create_branch(&store, &dev).unwrap();

        assert_eq!(at, Some(id("abc1234")));
        assert_eq!(store.load_branches().unwrap().commit_of("dev"), Some(&id("abc1234")));
    }

    #[test]
    fn test_duplicate_branch_error() {
        let (_dir, store) = setup();
        let dev = BranchName::new("dev").unwrap();
        RefManager::create_branch(&store, &dev).unwrap();
        let before = store.load_branches().unwrap();

        let result = RefManager::create_branch(&store, &dev);
        assert!(matches!(result, Err(StorageError::BranchAlreadyExists(_))));
        assert_eq!(store.load_branches().unwrap(), before);
    }

    #[test]
    fn test_create_branch_from_detached_head_is_unborn() {
        let (_dir, store) = setup();
        store.set_head(&HeadRef::new("abc1234")).unwrap();

        let topic = BranchName::new("topic").unwrap();
        let at = RefManager::create_branch(&store, &topic).unwrap();
        assert_eq!(at, None);

        let branches = store.load_branches().unwrap();
        // HEAD itself must not leak into the table
        assert!(!branches.contains("abc1234"));
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_advance_head_attached_and_detached() {
        let (_dir, store) = setup();

        let moved = RefManager::advance_head(&store, &id("aaaaaaa")).unwrap();
        assert_eq!(moved, Some(BranchName::master()));
        assert_eq!(store.load_branches().unwrap().commit_of("master"), Some(&id("aaaaaaa")));

        store.set_head(&HeadRef::new("aaaaaaa")).unwrap();

        let moved = RefManager::advance_head(&store, &id("bbbbbbb")).unwrap();
        assert_eq!(moved, None);
        assert_eq!(store.load_branches().unwrap().commit_of("master"), Some(&id("aaaaaaa")));
    }
}
