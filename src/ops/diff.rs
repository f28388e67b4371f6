use std::collections::BTreeMap;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::read_commit;
use crate::refs::resolve_rev;
use crate::repo::Repo;
use crate::types::{ChangeKind, DiffEntry};

/// compare two revisions and return the changed paths, sorted
pub fn diff(repo: &Repo, rev1: &str, rev2: &str) -> Result<Vec<DiffEntry>> {
    let commit1 = resolve_rev(repo, rev1)?;
    let commit2 = resolve_rev(repo, rev2)?;

    // identical commits have identical mappings
    if commit1 == commit2 {
        return Ok(vec![]);
    }

    let files1 = read_commit(repo, &commit1)?.files;
    let files2 = read_commit(repo, &commit2)?.files;

    Ok(diff_files(&files1, &files2))
}

/// compare two path -> blob mappings
///
/// blobs are content-addressed, so equal hashes mean equal content.
pub fn diff_files(old: &BTreeMap<String, Hash>, new: &BTreeMap<String, Hash>) -> Vec<DiffEntry> {
    let mut changes = Vec::new();

    for (path, hash) in old {
        match new.get(path) {
            None => changes.push(DiffEntry::new(path.as_str(), ChangeKind::Deleted)),
            Some(other) if other != hash => {
                changes.push(DiffEntry::new(path.as_str(), ChangeKind::Modified))
            }
            Some(_) => {}
        }
    }

    for path in new.keys() {
        if !old.contains_key(path) {
            changes.push(DiffEntry::new(path.as_str(), ChangeKind::Added));
        }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}
