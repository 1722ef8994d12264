//! storage layer for minigit
//!
//! this module owns everything under `.minigit/`. The shell uses the
//! [`Repository`] handle and never touches the files directly.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Repository                           │
//! │   (handle: init, add, commit, log, checkout, branch, merge) │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │   staging   │       │   commit    │       │  checkout   │
//!  │ (add files) │       │ (snapshots) │       │  (+ merge)  │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │                     │                     │
//!         │                     ▼                     ▼
//!         │              ┌─────────────┐       ┌─────────────┐
//!         │              │    hash     │       │    refs     │
//!         │              │ (commit id) │       │(branch/HEAD)│
//!         │              └─────────────┘       └─────────────┘
//!         │                                           │
//!         └─────────────────────┬─────────────────────┘
//!                               ▼
//!                        ┌─────────────┐
//!                        │    store    │
//!                        │  (on disk)  │
//!                        └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```no_run
//! use minigit::storage::Repository;
//!
//! let repo = Repository::open("./project");
//! repo.init()?;
//! repo.add("notes.txt")?;
//! repo.commit("first")?;
//! repo.create_branch("dev")?;
//! repo.checkout("dev")?;
//! # Ok::<(), minigit::storage::StorageError>(())
//! ```

mod checkout;
mod commit;
mod config;
mod error;
pub mod hash;
mod lock;
mod refs;
mod repository;
mod staging;
mod store;
mod types;

// Re-export public API
pub use checkout::{CheckoutOutcome, MergeOutcome};
pub use commit::{CommitOutcome, CommitRecord};
pub use config::{RepoSettings, RepositoryConfig};
pub use error::{StorageError, StorageResult};
pub use lock::RepoLock;
pub use refs::{BranchTable, RefManager};
pub use repository::{Repository, Status};
pub use staging::StagingArea;
pub use store::Store;
pub use types::{BranchName, CommitId, HeadRef, HeadState, IdWidth, InvalidNameError};
