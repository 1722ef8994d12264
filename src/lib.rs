//! MiniGit - a minimal snapshot-based version control engine
//!
//! Staged files become immutable commit snapshots, branches are mutable
//! pointers to commits, and any commit or branch can be copied back over
//! the working directory. Everything lives in a `.minigit/` directory next
//! to the files it tracks.
//!
//! # Example
//!
//! ```no_run
//! use minigit::storage::Repository;
//!
//! let repo = Repository::open(".");
//! repo.init().unwrap();
//! repo.add("notes.txt").unwrap();
//! let outcome = repo.commit("first").unwrap();
//! println!("committed {}", outcome.record.id);
//! ```

pub mod logging;
pub mod shell;
pub mod storage;
