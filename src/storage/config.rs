//! Repository configuration.
//!
//! [`RepositoryConfig`] is what a caller builds when opening a working
//! directory. [`RepoSettings`] is the part that must stay fixed for the
//! lifetime of a repository and is persisted in `.minigit/config.json`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::types::IdWidth;

/// Options for opening a repository handle.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Working directory holding the `.minigit` marker.
    pub work_dir: PathBuf,
    /// Id scheme used when a new repository is initialized.
    pub id_width: IdWidth,
    /// Take the cross-process lock around mutating operations.
    pub locking: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            id_width: IdWidth::Short,
            locking: true,
        }
    }
}

impl RepositoryConfig {
    /// Create a new configuration for the given working directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }

    /// Set the id width for newly initialized repositories.
    pub fn id_width(mut self, value: IdWidth) -> Self {
        self.id_width = value;
        self
    }

    /// Set the locking flag.
    pub fn locking(mut self, value: bool) -> Self {
        self.locking = value;
        self
    }

    /// settings written by `init`
    pub(crate) fn initial_settings(&self) -> RepoSettings {
        RepoSettings {
            id_width: self.id_width,
        }
    }
}

/// Per-repository settings stored alongside the commit log.
///
/// A repository without a config file uses the defaults, which match the
/// plain on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSettings {
    pub id_width: IdWidth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RepositoryConfig::new("/tmp/work")
            .id_width(IdWidth::Full)
            .locking(false);
        assert_eq!(config.work_dir, PathBuf::from("/tmp/work"));
        assert_eq!(config.initial_settings().id_width, IdWidth::Full);
        assert!(!config.locking);
    }

    #[test]
    fn test_settings_missing_fields_default() {
        let settings: RepoSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, RepoSettings::default());
        assert_eq!(settings.id_width, IdWidth::Short);
    }
}
