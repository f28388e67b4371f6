use std::path::Path;

use crate::error::Result;
use crate::fs::read_working_file;
use crate::index::Index;
use crate::ops::current_commit;
use crate::repo::Repo;

/// stage a working-tree file for the next commit
///
/// fails with `FileNotFound` before touching the staging area if the file is
/// missing. returns true if the staging area changed; staging content that
/// matches what is already staged (or, if nothing is staged, what HEAD
/// tracks) leaves the index file untouched.
pub fn add(repo: &Repo, path: &Path) -> Result<bool> {
    let name = repo.tracked_name(path)?;
    let content = read_working_file(&repo.working_path(&name))?;

    let mut index = Index::load(repo)?;
    let (_, head) = current_commit(repo)?;

    let changed = index.stage_addition(&name, &content, head.files.get(&name));
    if changed {
        index.save(repo)?;
        tracing::info!(path = %name, size = content.len(), "staged file");
    } else {
        tracing::debug!(path = %name, "file unchanged, nothing staged");
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::commit;
    use crate::Error;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_add_new_file() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        assert!(add(&repo, Path::new("a.txt")).unwrap());

        let index = Index::load(&repo).unwrap();
        assert_eq!(index.staged("a.txt"), Some(&b"hello"[..]));
        assert_eq!(index.removals().count(), 0);
    }

    #[test]
    fn test_add_nested_file() {
        let (dir, repo) = test_repo();
        fs::create_dir_all(dir.path().join("src/bin")).unwrap();
        fs::write(dir.path().join("src/bin/main.rs"), "fn main() {}").unwrap();

        add(&repo, &dir.path().join("src/bin/main.rs")).unwrap();

        let index = Index::load(&repo).unwrap();
        assert!(index.staged("src/bin/main.rs").is_some());
    }

    #[test]
    fn test_add_missing_file() {
        let (_dir, repo) = test_repo();
        let before = fs::read(repo.index_path()).unwrap();

        let result = add(&repo, Path::new("missing.txt"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
        assert_eq!(fs::read(repo.index_path()).unwrap(), before);
    }

    #[test]
    fn test_add_same_content_twice_leaves_index_identical() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        add(&repo, Path::new("a.txt")).unwrap();
        let before = fs::read(repo.index_path()).unwrap();

        assert!(!add(&repo, Path::new("a.txt")).unwrap());
        assert_eq!(fs::read(repo.index_path()).unwrap(), before);
    }

    #[test]
    fn test_add_updated_content_overwrites() {
        let (dir, repo) = test_repo();
        let file = dir.path().join("a.txt");

        fs::write(&file, "v1").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        fs::write(&file, "v2").unwrap();
        assert!(add(&repo, Path::new("a.txt")).unwrap());

        let index = Index::load(&repo).unwrap();
        assert_eq!(index.staged("a.txt"), Some(&b"v2"[..]));
    }

    #[test]
    fn test_add_committed_unchanged_file_is_noop() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        commit(&repo, "add a").unwrap();

        let before = fs::read(repo.index_path()).unwrap();
        assert!(!add(&repo, Path::new("a.txt")).unwrap());
        assert_eq!(fs::read(repo.index_path()).unwrap(), before);
        assert!(Index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_add_committed_modified_file() {
        let (dir, repo) = test_repo();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        commit(&repo, "add a").unwrap();

        fs::write(&file, "hello again").unwrap();
        assert!(add(&repo, Path::new("a.txt")).unwrap());
    }

    #[test]
    fn test_add_rejects_paths_outside_workdir() {
        let (dir, repo) = test_repo();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("x.txt"), "x").unwrap();

        let result = add(&repo, &outside.path().join("x.txt"));
        assert!(matches!(result, Err(Error::OutsideWorkdir(_))));

        let result = add(&repo, &dir.path().join(".minigit/HEAD"));
        assert!(matches!(result, Err(Error::InvalidArguments(_))));
    }

    #[test]
    fn test_add_tracked_content_after_rm_keeps_removal() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        commit(&repo, "add a").unwrap();
        crate::ops::rm(&repo, Path::new("a.txt")).unwrap();

        let before = fs::read(repo.index_path()).unwrap();
        assert!(!add(&repo, Path::new("a.txt")).unwrap());
        assert_eq!(fs::read(repo.index_path()).unwrap(), before);
        assert!(Index::load(&repo).unwrap().is_removed("a.txt"));
    }

    #[test]
    fn test_add_changed_content_after_rm_cancels_removal() {
        let (dir, repo) = test_repo();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        commit(&repo, "add a").unwrap();
        crate::ops::rm(&repo, Path::new("a.txt")).unwrap();

        fs::write(&file, "hello again").unwrap();
        assert!(add(&repo, Path::new("a.txt")).unwrap());

        let index = Index::load(&repo).unwrap();
        assert!(!index.is_removed("a.txt"));
        assert_eq!(index.staged("a.txt"), Some(&b"hello again"[..]));
    }

    #[cfg(unix)]
    #[test]
    fn test_add_non_utf8_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (dir, repo) = test_repo();
        let file = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
        fs::write(&file, "x").unwrap();
        let before = fs::read(repo.index_path()).unwrap();

        let result = add(&repo, &file);
        assert!(matches!(result, Err(Error::InvalidArguments(_))));
        assert_eq!(fs::read(repo.index_path()).unwrap(), before);
    }
}
