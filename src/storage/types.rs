//! core type-safe wrappers for commit ids, branch names and HEAD.

use std::borrow::Borrow;
use std::fmt;
use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

/// Identifier of a commit snapshot.
///
/// Ids are short lowercase hex strings derived from the commit message and
/// timestamp (see [`crate::storage::hash`]). They are NOT content-addressed:
/// two commits made in the same second with the same message get the same
/// id, and the later one overwrites the earlier snapshot's files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
    /// longest id any [`IdWidth`] produces (16 hex digits of a u64)
    pub const MAX_LEN: usize = 16;

    /// wrap a digest produced by the hasher (already valid hex)
    pub(crate) fn new(hex: String) -> Self {
        Self(hex)
    }

    /// parse a CommitId from a hex string
    ///
    /// Only 1-16 lowercase hex digits are accepted, which also keeps a
    /// checkout target from ever naming `staging` or any other entry of the
    /// repository directory.
    pub fn from_hex(hex: &str) -> Result<Self, InvalidNameError> {
        if hex.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        if hex.len() > Self::MAX_LEN {
            return Err(InvalidNameError::TooLong(hex.len()));
        }
        for (i, c) in hex.chars().enumerate() {
            if !matches!(c, '0'..='9' | 'a'..='f') {
                return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
            }
        }
        Ok(Self(hex.to_string()))
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How many hex digits of the commit hash make up a [`CommitId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdWidth {
    /// 7 hex digits of `hash(message + timestamp)`, 2^28 distinct values
    #[default]
    Short,
    /// all 16 hex digits, with the staged file bytes mixed into the input
    Full,
}

impl IdWidth {
    pub const SHORT_LEN: usize = 7;

    /// maximum number of hex characters kept from the digest
    pub fn max_len(self) -> usize {
        match self {
            IdWidth::Short => Self::SHORT_LEN,
            IdWidth::Full => CommitId::MAX_LEN,
        }
    }

    /// whether staged content participates in the id
    pub fn mixes_content(self) -> bool {
        matches!(self, IdWidth::Full)
    }
}

/// A validated branch name.
///
/// Branch names are stored one per line as `name|commit_id`, so names may
/// not contain the delimiter, whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    /// the branch created by `init`
    pub const MASTER: &'static str = "master";

    /// create a new BranchName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), InvalidNameError> {
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if name.len() > 255 {
            return Err(InvalidNameError::TooLong(name.len()));
        }

        for (i, c) in name.chars().enumerate() {
            if c == '|' || c.is_whitespace() || c.is_control() {
                return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
            }
        }

        Ok(())
    }

    /// create the master branch reference
    pub fn master() -> Self {
        Self(Self::MASTER.to_string())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// lets the branch table be queried with plain `&str`
impl Borrow<str> for BranchName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The raw value stored in the HEAD file.
///
/// HEAD holds whatever was last checked out, verbatim: a branch name or a
/// raw commit id. Whether it is attached is decided against the branch table
/// at the time of use, see [`HeadRef::state`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeadRef(String);

impl HeadRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// HEAD as written by `init`
    pub fn master() -> Self {
        Self(BranchName::MASTER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// classify HEAD against the given branch table
    pub fn state(&self, branches: &crate::storage::BranchTable) -> HeadState {
        match branches.find(&self.0) {
            Some(name) => HeadState::Attached(name.clone()),
            None => HeadState::Detached(self.0.clone()),
        }
    }
}

impl fmt::Display for HeadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether HEAD goes through a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD names a branch present in the branch table
    Attached(BranchName),
    /// HEAD holds anything else, normally a raw commit id
    Detached(String),
}

impl HeadState {
    pub fn is_detached(&self) -> bool {
        matches!(self, HeadState::Detached(_))
    }
}

/// error type for invalid names (branches, commit ids)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    TooLong(usize),
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::TooLong(len) => write!(f, "name too long: {} characters", len),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
        }
    }
}

impl std::error::Error for InvalidNameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_id_valid() {
        assert!(CommitId::from_hex("a1b2c3d").is_ok());
        assert!(CommitId::from_hex("0").is_ok());
        assert!(CommitId::from_hex("0123456789abcdef").is_ok());
    }

    #[test]
    fn test_commit_id_invalid() {
        assert_eq!(CommitId::from_hex(""), Err(InvalidNameError::Empty));
        assert!(CommitId::from_hex("staging").is_err());
        assert!(CommitId::from_hex("ABCDEF0").is_err());
        assert!(CommitId::from_hex("../abcd").is_err());
        assert!(CommitId::from_hex("0123456789abcdef0").is_err()); // 17 chars
    }

    #[test]
    fn test_branch_name_valid() {
        assert!(BranchName::new("dev").is_ok());
        assert!(BranchName::new("feature/login").is_ok());
        assert!(BranchName::new("v1.0-rc").is_ok());
    }

    #[test]
    fn test_branch_name_invalid() {
        assert!(BranchName::new("").is_err());
        assert!(BranchName::new("a|b").is_err());
        assert!(BranchName::new("two words").is_err());
        assert!(BranchName::new("tab\there").is_err());
        assert!(BranchName::new("x".repeat(256)).is_err());
    }

    #[test]
    fn test_id_width() {
        assert_eq!(IdWidth::default(), IdWidth::Short);
        assert_eq!(IdWidth::Short.max_len(), 7);
        assert_eq!(IdWidth::Full.max_len(), 16);
        assert!(!IdWidth::Short.mixes_content());
        assert!(IdWidth::Full.mixes_content());
    }

    #[test]
    fn test_id_width_serde() {
        assert_eq!(serde_json::to_string(&IdWidth::Full).unwrap(), "\"full\"");
        let parsed: IdWidth = serde_json::from_str("\"short\"").unwrap();
        assert_eq!(parsed, IdWidth::Short);
    }
}
