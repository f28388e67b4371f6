use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{write_blob, write_commit};
use crate::ops::current_commit;
use crate::refs::{read_head, write_branch, write_head, Head};
use crate::repo::Repo;
use crate::types::Commit;

/// record the staging area as a new commit on top of HEAD
///
/// the new mapping is the parent's mapping with every staged addition
/// written as a blob and mapped (last write wins) and every staged removal
/// dropped. ordering of durable writes:
///
/// 1. blobs, then the commit object (append-only, safe to repeat)
/// 2. the emptied staging area
/// 3. the branch pointer (or HEAD itself when detached)
///
/// a failure at any step leaves the branch and HEAD at their previous,
/// valid commit.
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    if message.trim().is_empty() {
        return Err(Error::InvalidArguments(
            "please enter a commit message".to_string(),
        ));
    }

    let mut index = Index::load(repo)?;
    if index.is_empty() {
        return Err(Error::NothingToCommit);
    }

    let head = read_head(repo)?;
    let (parent_hash, parent) = current_commit(repo)?;

    let mut files = parent.files;
    for (path, content) in index.additions() {
        let blob = write_blob(repo, content)?;
        files.insert(path.to_string(), blob);
    }
    for path in index.removals() {
        files.remove(path);
    }

    let commit = Commit::new(message, files, Some(parent_hash));
    let hash = write_commit(repo, &commit)?;

    index.clear();
    index.save(repo)?;

    match head {
        Head::Branch(name) => write_branch(repo, &name, &hash)?,
        Head::Detached(_) => write_head(repo, &Head::Detached(hash))?,
    }

    tracing::info!(%hash, parent = %parent_hash, files = commit.files.len(), "created commit");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::compute_hash;
    use crate::object::{blob_exists, read_blob, read_commit};
    use crate::ops::{add, rm};
    use crate::refs::{read_branch, resolve_head};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use walkdir::WalkDir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn stage(dir: &Path, repo: &Repo, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        add(repo, Path::new(name)).unwrap();
    }

    fn object_count(repo: &Repo) -> usize {
        WalkDir::new(repo.objects_path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn test_commit_single_file() {
        let (dir, repo) = test_repo();
        let root = resolve_head(&repo).unwrap();
        stage(dir.path(), &repo, "a.txt", "hello");

        let hash = commit(&repo, "add a").unwrap();

        let c = read_commit(&repo, &hash).unwrap();
        assert_eq!(c.message, "add a");
        assert_eq!(c.parent, Some(root));
        assert_eq!(c.files.len(), 1);
        assert_eq!(c.files["a.txt"], compute_hash(b"hello"));

        assert!(blob_exists(&repo, &compute_hash(b"hello")));
        assert_eq!(read_blob(&repo, &c.files["a.txt"]).unwrap(), b"hello");

        assert_eq!(read_branch(&repo, "master").unwrap(), hash);
        assert_eq!(resolve_head(&repo).unwrap(), hash);
        assert!(Index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_commit_empty_staging_area() {
        let (_dir, repo) = test_repo();
        let head_before = fs::read(repo.head_path()).unwrap();
        let branch_before = read_branch(&repo, "master").unwrap();
        let objects_before = object_count(&repo);

        let result = commit(&repo, "nothing");
        assert!(matches!(result, Err(Error::NothingToCommit)));

        assert_eq!(fs::read(repo.head_path()).unwrap(), head_before);
        assert_eq!(read_branch(&repo, "master").unwrap(), branch_before);
        assert_eq!(object_count(&repo), objects_before);
    }

    #[test]
    fn test_commit_requires_message() {
        let (dir, repo) = test_repo();
        stage(dir.path(), &repo, "a.txt", "hello");

        let result = commit(&repo, "   ");
        assert!(matches!(result, Err(Error::InvalidArguments(_))));
        assert!(!Index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_commit_inherits_parent_mapping() {
        let (dir, repo) = test_repo();
        stage(dir.path(), &repo, "a.txt", "a");
        let first = commit(&repo, "first").unwrap();

        stage(dir.path(), &repo, "b.txt", "b");
        let second = commit(&repo, "second").unwrap();

        let c = read_commit(&repo, &second).unwrap();
        assert_eq!(c.parent, Some(first));
        assert_eq!(c.files["a.txt"], compute_hash(b"a"));
        assert_eq!(c.files["b.txt"], compute_hash(b"b"));
    }

    #[test]
    fn test_commit_overwrites_modified_file() {
        let (dir, repo) = test_repo();
        stage(dir.path(), &repo, "a.txt", "v1");
        commit(&repo, "v1").unwrap();

        stage(dir.path(), &repo, "a.txt", "v2");
        let hash = commit(&repo, "v2").unwrap();

        let c = read_commit(&repo, &hash).unwrap();
        assert_eq!(c.files.len(), 1);
        assert_eq!(c.files["a.txt"], compute_hash(b"v2"));
        // the old blob is still stored
        assert!(blob_exists(&repo, &compute_hash(b"v1")));
    }

    #[test]
    fn test_commit_applies_removals() {
        let (dir, repo) = test_repo();
        stage(dir.path(), &repo, "a.txt", "a");
        stage(dir.path(), &repo, "b.txt", "b");
        commit(&repo, "both").unwrap();

        rm(&repo, Path::new("a.txt")).unwrap();
        let hash = commit(&repo, "drop a").unwrap();

        let c = read_commit(&repo, &hash).unwrap();
        assert!(!c.files.contains_key("a.txt"));
        assert!(c.files.contains_key("b.txt"));
    }

    #[test]
    fn test_identical_content_shares_blob() {
        let (dir, repo) = test_repo();
        stage(dir.path(), &repo, "a.txt", "same");
        stage(dir.path(), &repo, "dir/b.txt", "same");

        let hash = commit(&repo, "dupes").unwrap();
        let c = read_commit(&repo, &hash).unwrap();
        assert_eq!(c.files["a.txt"], c.files["dir/b.txt"]);

        let blobs = WalkDir::new(repo.blobs_path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count();
        assert_eq!(blobs, 1);
    }

    #[test]
    fn test_commit_detached_head() {
        let (dir, repo) = test_repo();
        let root = resolve_head(&repo).unwrap();
        write_head(&repo, &Head::Detached(root)).unwrap();

        stage(dir.path(), &repo, "a.txt", "a");
        let hash = commit(&repo, "detached work").unwrap();

        assert_eq!(read_head(&repo).unwrap(), Head::Detached(hash));
        assert_eq!(read_branch(&repo, "master").unwrap(), root);
    }

    #[test]
    fn test_commit_with_missing_parent_fails_cleanly() {
        let (dir, repo) = test_repo();
        stage(dir.path(), &repo, "a.txt", "a");

        let bogus = compute_hash(b"no such commit");
        write_branch(&repo, "master", &bogus).unwrap();

        let result = commit(&repo, "orphan");
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
        assert_eq!(read_branch(&repo, "master").unwrap(), bogus);
        assert!(!Index::load(&repo).unwrap().is_empty());
    }
}
