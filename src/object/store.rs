use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{not_found_or_io, Error, Result};
use crate::fs::write_atomic;
use crate::hash::{compute_hash, Hash};
use crate::repo::Repo;

/// the two object kinds, each stored under its own directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    /// directory holding objects of this kind
    pub fn dir(&self, repo: &Repo) -> PathBuf {
        match self {
            ObjectKind::Blob => repo.blobs_path(),
            ObjectKind::Commit => repo.commits_path(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// path of an object: `<kind dir>/<2 hex>/<62 hex>`
pub fn object_path(repo: &Repo, kind: ObjectKind, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    kind.dir(repo).join(dir).join(file)
}

/// check if an object exists in the store
pub fn object_exists(repo: &Repo, kind: ObjectKind, hash: &Hash) -> bool {
    object_path(repo, kind, hash).exists()
}

/// store `content` under its hash, returning the hash
///
/// objects are immutable: if the hash is already present nothing is written.
pub fn put_object(repo: &Repo, kind: ObjectKind, content: &[u8]) -> Result<Hash> {
    let hash = compute_hash(content);
    let path = object_path(repo, kind, &hash);

    // deduplication: if object already exists, we're done
    if path.exists() {
        tracing::debug!(%kind, %hash, "object already stored");
        return Ok(hash);
    }

    write_atomic(&repo.tmp_path(), &path, content)?;
    tracing::debug!(%kind, %hash, size = content.len(), "stored object");

    Ok(hash)
}

/// read an object's bytes
///
/// with `verify_objects` enabled the bytes are re-hashed and a mismatch is
/// reported as `CorruptObject`.
pub fn get_object(repo: &Repo, kind: ObjectKind, hash: &Hash) -> Result<Vec<u8>> {
    let path = object_path(repo, kind, hash);
    let content = read_object_file(&path, hash)?;

    if repo.config().verify_objects && compute_hash(&content) != *hash {
        tracing::warn!(%kind, %hash, "object hash mismatch");
        return Err(Error::CorruptObject(*hash));
    }

    Ok(content)
}

fn read_object_file(path: &Path, hash: &Hash) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| not_found_or_io(e, path, || Error::ObjectNotFound(*hash)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::tempdir;
    use walkdir::WalkDir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn count_files(path: &Path) -> usize {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn test_put_and_get() {
        let (_dir, repo) = test_repo();

        let hash = put_object(&repo, ObjectKind::Blob, b"hello").unwrap();
        assert_eq!(hash, compute_hash(b"hello"));
        assert!(object_exists(&repo, ObjectKind::Blob, &hash));
        assert!(!object_exists(&repo, ObjectKind::Commit, &hash));

        assert_eq!(get_object(&repo, ObjectKind::Blob, &hash).unwrap(), b"hello");
    }

    #[test]
    fn test_put_is_idempotent() {
        let (_dir, repo) = test_repo();

        let h1 = put_object(&repo, ObjectKind::Blob, b"duplicate").unwrap();
        let h2 = put_object(&repo, ObjectKind::Blob, b"duplicate").unwrap();

        assert_eq!(h1, h2);
        assert_eq!(count_files(&repo.blobs_path()), 1);
        assert_eq!(fs::read_dir(repo.tmp_path()).unwrap().count(), 0);
    }

    #[test]
    fn test_object_path_structure() {
        let (_dir, repo) = test_repo();

        let hash = put_object(&repo, ObjectKind::Blob, b"test").unwrap();
        let path = object_path(&repo, ObjectKind::Blob, &hash);

        let hex = hash.to_hex();
        assert!(path.ends_with(format!("{}/{}", &hex[..2], &hex[2..])));
        assert!(path.starts_with(repo.blobs_path()));
    }

    #[test]
    fn test_get_missing() {
        let (_dir, repo) = test_repo();

        let result = get_object(&repo, ObjectKind::Blob, &compute_hash(b"never stored"));
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_get_detects_corruption() {
        let (_dir, repo) = test_repo();

        let hash = put_object(&repo, ObjectKind::Blob, b"original").unwrap();
        fs::write(object_path(&repo, ObjectKind::Blob, &hash), b"tampered").unwrap();

        let result = get_object(&repo, ObjectKind::Blob, &hash);
        assert!(matches!(result, Err(Error::CorruptObject(h)) if h == hash));
    }

    #[test]
    fn test_get_without_verification() {
        let dir = tempdir().unwrap();
        let config = Config {
            verify_objects: false,
            ..Config::default()
        };
        let repo = Repo::init_with_config(dir.path(), config).unwrap();

        let hash = put_object(&repo, ObjectKind::Blob, b"original").unwrap();
        fs::write(object_path(&repo, ObjectKind::Blob, &hash), b"tampered").unwrap();

        assert_eq!(get_object(&repo, ObjectKind::Blob, &hash).unwrap(), b"tampered");
    }
}
