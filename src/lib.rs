//! minigit - minimal content-addressed version control
//!
//! an immutable object store of blobs and commits, a persisted staging area,
//! and named branch pointers plus HEAD. everything lives under `.minigit` in
//! the working directory.
//!
//! # Core concepts
//!
//! - **Blob**: raw file content, stored once per distinct content
//! - **Commit**: message, timestamp, path -> blob mapping and optional parent,
//!   stored as canonical CBOR
//! - **Index**: the staging area, pending additions and removals
//! - **Branch**: a named pointer to a commit
//! - **HEAD**: the active branch name, or a commit hash when detached
//!
//! # Hash format
//!
//! hash = SHA256(bytes), where bytes are the raw content for blobs and the
//! canonical encoding for commits. objects live at
//! `objects/<kind>/<first 2 hex>/<remaining 62 hex>`.
//!
//! # Example usage
//!
//! ```no_run
//! use minigit::{ops, Repo};
//! use std::path::Path;
//!
//! // initialize a repository in the current directory
//! let repo = Repo::init(Path::new(".")).unwrap();
//!
//! // stage a file and commit it
//! ops::add(&repo, Path::new("README.md")).unwrap();
//! let hash = ops::commit(&repo, "add readme").unwrap();
//! println!("{}", hash);
//! ```

mod config;
mod error;
mod hash;
mod index;
mod object;
mod refs;
mod repo;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::{Config, DEFAULT_BRANCH};
pub use error::{Error, Result};
pub use hash::{compute_hash, looks_like_hash, Hash};
pub use index::Index;
pub use object::{
    blob_exists, blob_path, commit_exists, commit_path, get_object, put_object, read_blob,
    read_commit, write_blob, write_commit, ObjectKind,
};
pub use refs::{
    branch_exists, list_branches, read_branch, read_head, resolve_head, resolve_rev, write_branch,
    write_head, Head,
};
pub use repo::{Repo, RepoLock, REPO_DIR};
pub use types::{ChangeKind, Commit, DiffEntry};
