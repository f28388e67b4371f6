use std::path::PathBuf;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::store::{get_object, object_exists, object_path, put_object, ObjectKind};
use crate::repo::Repo;
use crate::types::Commit;

/// write a commit to the object store
///
/// the commit is stored in its canonical encoding and named by the hash of
/// those bytes, so the returned hash always equals `commit.hash()`.
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let bytes = commit.to_bytes()?;
    put_object(repo, ObjectKind::Commit, &bytes)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let bytes = get_object(repo, ObjectKind::Commit, hash)?;
    Commit::from_bytes(&bytes)
}

/// get the filesystem path to a commit object
pub fn commit_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(repo, ObjectKind::Commit, hash)
}

/// check if a commit exists in the object store
pub fn commit_exists(repo: &Repo, hash: &Hash) -> bool {
    object_exists(repo, ObjectKind::Commit, hash)
}
