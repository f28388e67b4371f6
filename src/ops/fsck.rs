use std::collections::HashSet;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_hash, Hash};
use crate::object::{blob_exists, object_path, ObjectKind};
use crate::refs::{list_branches, read_branch, read_head, Head};
use crate::repo::Repo;
use crate::types::Commit;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects checked
    pub objects_checked: usize,
    /// corrupt objects (hash mismatch or undecodable)
    pub corrupt_objects: Vec<CorruptObject>,
    /// missing objects referenced by other objects or pointers
    pub missing_objects: Vec<MissingObject>,
    /// dangling objects (not reachable from any branch or HEAD)
    pub dangling_objects: Vec<Hash>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty() && self.missing_objects.is_empty()
    }
}

#[derive(Debug)]
pub struct CorruptObject {
    pub hash: Hash,
    pub kind: ObjectKind,
    pub message: String,
}

#[derive(Debug)]
pub struct MissingObject {
    pub hash: Hash,
    pub kind: ObjectKind,
    pub referenced_by: String,
}

/// verify repository integrity
///
/// every stored object is re-hashed regardless of `verify_objects`, then the
/// history reachable from each branch and a detached HEAD is walked to find
/// missing commits and blobs.
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut reachable = Reachable::default();

    let mut roots = Vec::new();
    for branch in list_branches(repo)? {
        roots.push((read_branch(repo, &branch)?, format!("branch {}", branch)));
    }
    if let Head::Detached(hash) = read_head(repo)? {
        roots.push((hash, "HEAD".to_string()));
    }

    for (hash, referenced_by) in roots {
        check_history(repo, hash, referenced_by, &mut reachable, &mut report)?;
    }

    for kind in [ObjectKind::Blob, ObjectKind::Commit] {
        for hash in list_objects(&kind.dir(repo))? {
            report.objects_checked += 1;

            let path = object_path(repo, kind, &hash);
            let content = fs::read(&path).with_path(&path)?;
            let actual = compute_hash(&content);
            if actual != hash {
                tracing::warn!(%kind, %hash, %actual, "corrupt object");
                report.corrupt_objects.push(CorruptObject {
                    hash,
                    kind,
                    message: format!("hash mismatch: expected {}, got {}", hash, actual),
                });
            }

            if !reachable.contains(kind, &hash) {
                report.dangling_objects.push(hash);
            }
        }
    }

    Ok(report)
}

#[derive(Default)]
struct Reachable {
    blobs: HashSet<Hash>,
    commits: HashSet<Hash>,
}

impl Reachable {
    fn contains(&self, kind: ObjectKind, hash: &Hash) -> bool {
        match kind {
            ObjectKind::Blob => self.blobs.contains(hash),
            ObjectKind::Commit => self.commits.contains(hash),
        }
    }
}

/// walk a parent chain, recording reachable objects and missing references
fn check_history(
    repo: &Repo,
    start: Hash,
    referenced_by: String,
    reachable: &mut Reachable,
    report: &mut FsckReport,
) -> Result<()> {
    let mut next = Some((start, referenced_by));

    while let Some((hash, referenced_by)) = next.take() {
        if !reachable.commits.insert(hash) {
            return Ok(());
        }

        // read raw bytes: hash mismatches are reported by the object scan
        let path = object_path(repo, ObjectKind::Commit, &hash);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                report.missing_objects.push(MissingObject {
                    hash,
                    kind: ObjectKind::Commit,
                    referenced_by,
                });
                return Ok(());
            }
            Err(e) => return Err(Error::Io { path, source: e }),
        };

        let commit = match Commit::from_bytes(&bytes) {
            Ok(commit) => commit,
            Err(Error::CorruptObjectMessage(message)) => {
                report.corrupt_objects.push(CorruptObject {
                    hash,
                    kind: ObjectKind::Commit,
                    message,
                });
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for (path, blob) in &commit.files {
            reachable.blobs.insert(*blob);
            if !blob_exists(repo, blob) {
                report.missing_objects.push(MissingObject {
                    hash: *blob,
                    kind: ObjectKind::Blob,
                    referenced_by: format!("commit {} path {}", hash, path),
                });
            }
        }

        next = commit.parent.map(|parent| (parent, format!("commit {}", hash)));
    }

    Ok(())
}

/// every hash stored under an object directory
fn list_objects(dir: &Path) -> Result<Vec<Hash>> {
    let mut hashes = Vec::new();

    if !dir.exists() {
        return Ok(hashes);
    }

    for entry in WalkDir::new(dir).min_depth(2).max_depth(2).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let parent_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");

        let hex = format!("{}{}", parent_name, file_name);
        if let Ok(hash) = Hash::from_hex(&hex) {
            hashes.push(hash);
        }
    }

    Ok(hashes)
}
