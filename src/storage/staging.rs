//! The staging area.
//!
//! Staged files live flat under `.minigit/staging/`, keyed by base name
//! only: `a/notes.txt` and `b/notes.txt` land on the same entry and the
//! later `add` wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::error::{StorageError, StorageResult};

/// Files added but not yet committed.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy the current bytes of `source` into the staging area.
    ///
    /// Returns the name it was staged under. The staging directory is
    /// created on first use.
    pub fn stage(&self, source: &Path) -> StorageResult<String> {
        let metadata = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound(source.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(StorageError::NotAFile(source.to_path_buf()));
        }

        let name = source
            .file_name()
            .ok_or_else(|| StorageError::NotAFile(source.to_path_buf()))?
            .to_string_lossy()
            .into_owned();

        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(&name);
        if dest.exists() {
            // copying a file onto itself truncates it
            if fs::canonicalize(source)? == fs::canonicalize(&dest)? {
                tracing::debug!(file = %name, "already the staged copy");
                return Ok(name);
            }
            tracing::debug!(file = %name, "replacing staged copy");
        }
        fs::copy(source, &dest)?;

        tracing::info!(file = %name, source = %source.display(), "staged file");
        Ok(name)
    }

    /// True if nothing is staged, including when the area was never created.
    pub fn is_empty(&self) -> StorageResult<bool> {
        match fs::read_dir(&self.dir) {
            Ok(mut entries) => Ok(entries.next().is_none()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of the staged files, sorted.
    pub fn files(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Remove every staged file.
    pub fn clear(&self) -> StorageResult<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StagingArea) {
        let dir = TempDir::new().unwrap();
        let staging = StagingArea::new(dir.path().join("staging"));
        (dir, staging)
    }

    #[test]
    fn test_never_created_is_empty() {
        let (_dir, staging) = setup();
        assert!(staging.is_empty().unwrap());
        assert!(staging.files().unwrap().is_empty());
        staging.clear().unwrap();
    }

    #[test]
    fn test_stage_copies_bytes() {
        let (dir, staging) = setup();
        let source = dir.path().join("f.txt");
        fs::write(&source, "A").unwrap();

        let name = staging.stage(&source).unwrap();
        assert_eq!(name, "f.txt");
        assert!(!staging.is_empty().unwrap());

        // later edits to the working copy don't reach the staged copy
        fs::write(&source, "B").unwrap();
        assert_eq!(fs::read_to_string(staging.dir().join("f.txt")).unwrap(), "A");
    }

    #[test]
    fn test_restage_staged_copy_keeps_bytes() {
        let (dir, staging) = setup();
        let source = dir.path().join("f.txt");
        fs::write(&source, "hello").unwrap();
        staging.stage(&source).unwrap();

        let staged = staging.dir().join("f.txt");
        assert_eq!(staging.stage(&staged).unwrap(), "f.txt");
        assert_eq!(fs::read_to_string(&staged).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_restage_through_symlink_keeps_bytes() {
        let (dir, staging) = setup();
        let source = dir.path().join("f.txt");
        fs::write(&source, "hello").unwrap();
        staging.stage(&source).unwrap();

        let link_dir = dir.path().join("links");
        fs::create_dir(&link_dir).unwrap();
        let link = link_dir.join("f.txt");
        std::os::unix::fs::symlink(staging.dir().join("f.txt"), &link).unwrap();

        staging.stage(&link).unwrap();
        assert_eq!(fs::read_to_string(staging.dir().join("f.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_missing_file() {
        let (dir, staging) = setup();
        let result = staging.stage(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));
        assert!(!staging.dir().exists());
    }

    #[test]
    fn test_directory_rejected() {
        let (dir, staging) = setup();
        let result = staging.stage(dir.path());
        assert!(matches!(result, Err(StorageError::NotAFile(_))));
    }

    #[test]
    fn test_same_base_name_collides() {
        let (dir, staging) = setup();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/notes.txt"), "from a").unwrap();
        fs::write(dir.path().join("b/notes.txt"), "from b").unwrap();

        staging.stage(&dir.path().join("a/notes.txt")).unwrap();
        staging.stage(&dir.path().join("b/notes.txt")).unwrap();

        assert_eq!(staging.files().unwrap(), vec!["notes.txt".to_string()]);
        assert_eq!(
            fs::read_to_string(staging.dir().join("notes.txt")).unwrap(),
            "from b"
        );
    }

    #[test]
    fn test_clear() {
        let (dir, staging) = setup();
        fs::write(dir.path().join("x.txt"), "x").unwrap();
        fs::write(dir.path().join("y.txt"), "y").unwrap();
        staging.stage(&dir.path().join("y.txt")).unwrap();
        staging.stage(&dir.path().join("x.txt")).unwrap();
        assert_eq!(staging.files().unwrap(), vec!["x.txt", "y.txt"]);

        staging.clear().unwrap();
        assert!(staging.is_empty().unwrap());
        assert!(!staging.dir().exists());
    }
}
