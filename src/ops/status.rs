use std::collections::BTreeSet;
use std::fmt;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::{compute_hash, Hash};
use crate::index::Index;
use crate::ops::current_commit;
use crate::refs::{read_head, Head};
use crate::repo::{is_store_dir, Repo};
use crate::types::{ChangeKind, DiffEntry};

/// snapshot of the repository relative to HEAD and the working tree
#[derive(Debug, Clone)]
pub struct Status {
    pub head: Head,
    pub commit: Hash,
    /// staged additions: `Added` for new paths, `Modified` for tracked ones
    pub staged: Vec<DiffEntry>,
    /// paths staged for removal
    pub removed: Vec<String>,
    /// working files that differ from what the next commit would record
    pub unstaged: Vec<DiffEntry>,
    /// working files the next commit would not track
    pub untracked: Vec<String>,
}

impl Status {
    /// true if nothing is staged
    pub fn is_clean_index(&self) -> bool {
        self.staged.is_empty() && self.removed.is_empty()
    }
}

/// compute repository status; all lists are sorted by path
pub fn status(repo: &Repo) -> Result<Status> {
    let head = read_head(repo)?;
    let (commit_hash, commit) = current_commit(repo)?;
    let index = Index::load(repo)?;

    let staged = index
        .additions()
        .map(|(path, _)| {
            let kind = if commit.files.contains_key(path) {
                ChangeKind::Modified
            } else {
                ChangeKind::Added
            };
            DiffEntry::new(path, kind)
        })
        .collect();

    let removed = index.removals().map(String::from).collect();

    // what the next commit will track, and the content it expects
    let mut expected: Vec<(String, Hash)> = commit
        .files
        .iter()
        .filter(|(path, _)| !index.is_removed(path) && index.staged(path).is_none())
        .map(|(path, hash)| (path.clone(), *hash))
        .collect();
    expected.extend(
        index
            .additions()
            .map(|(path, content)| (path.to_string(), compute_hash(content))),
    );
    expected.sort();

    let mut unstaged = Vec::new();
    for (path, hash) in &expected {
        match std::fs::read(repo.working_path(path)) {
            Ok(content) if compute_hash(&content) != *hash => {
                unstaged.push(DiffEntry::new(path.as_str(), ChangeKind::Modified));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                unstaged.push(DiffEntry::new(path.as_str(), ChangeKind::Deleted));
            }
            Err(e) => {
                return Err(Error::Io {
                    path: repo.working_path(path),
                    source: e,
                })
            }
        }
    }

    let tracked: BTreeSet<&str> = expected.iter().map(|(p, _)| p.as_str()).collect();
    let untracked = untracked_files(repo, &tracked)?;

    Ok(Status {
        head,
        commit: commit_hash,
        staged,
        removed,
        unstaged,
        untracked,
    })
}

/// walk the working tree for regular files not in `tracked`
fn untracked_files(repo: &Repo, tracked: &BTreeSet<&str>) -> Result<Vec<String>> {
    let mut untracked = Vec::new();

    let walker = WalkDir::new(repo.workdir())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() != 1 || !e.file_name().to_str().is_some_and(is_store_dir));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Io {
            path: e.path().map(|p| p.to_path_buf()).unwrap_or_default(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = match repo.tracked_name(entry.path()) {
            Ok(name) => name,
            Err(Error::InvalidArguments(reason)) => {
                tracing::warn!(%reason, "skipping untrackable file");
                continue;
            }
            Err(e) => return Err(e),
        };
        if !tracked.contains(name.as_str()) {
            untracked.push(name);
        }
    }

    untracked.sort();
    Ok(untracked)
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            Head::Branch(name) => writeln!(f, "On branch {}", name)?,
            Head::Detached(hash) => writeln!(f, "HEAD detached at {}", hash.short())?,
        }

        writeln!(f, "\n=== Staged Files ===")?;
        for entry in &self.staged {
            writeln!(f, "{}", entry)?;
        }

        writeln!(f, "\n=== Removed Files ===")?;
        for path in &self.removed {
            writeln!(f, "{}", path)?;
        }

        writeln!(f, "\n=== Modifications Not Staged For Commit ===")?;
        for entry in &self.unstaged {
            writeln!(f, "{}", entry)?;
        }

        writeln!(f, "\n=== Untracked Files ===")?;
        for path in &self.untracked {
            writeln!(f, "{}", path)?;
        }

        Ok(())
    }
}
