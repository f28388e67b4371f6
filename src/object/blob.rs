use std::path::PathBuf;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::store::{get_object, object_exists, object_path, put_object, ObjectKind};
use crate::repo::Repo;

/// write a blob to the object store
///
/// the hash is taken over the raw content alone, so identical files share
/// one stored blob regardless of path or name.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    put_object(repo, ObjectKind::Blob, content)
}

/// read blob content
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    get_object(repo, ObjectKind::Blob, hash)
}

/// get the filesystem path to a blob
pub fn blob_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(repo, ObjectKind::Blob, hash)
}

/// check if a blob exists in the object store
pub fn blob_exists(repo: &Repo, hash: &Hash) -> bool {
    object_exists(repo, ObjectKind::Blob, hash)
}
