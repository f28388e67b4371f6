use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{not_found_or_io, Error, IoResultExt, Result};
use crate::fs::write_atomic;
use crate::hash::{looks_like_hash, Hash, HASH_HEX_LEN};
use crate::repo::Repo;

/// shortest hash prefix accepted when resolving a revision
pub const MIN_PREFIX_LEN: usize = 4;

/// what HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// attached to a branch; commits advance that branch
    Branch(String),
    /// detached at a specific commit
    Detached(Hash),
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Head::Branch(name) => f.write_str(name),
            Head::Detached(hash) => write!(f, "{}", hash),
        }
    }
}

/// write a branch (create or update)
pub fn write_branch(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    validate_branch_name(name)?;

    let path = repo.branches_path().join(name);
    write_atomic(&repo.tmp_path(), &path, format!("{}\n", hash.to_hex()).as_bytes())?;

    tracing::info!(branch = name, %hash, "updated branch");
    Ok(())
}

/// read a branch
pub fn read_branch(repo: &Repo, name: &str) -> Result<Hash> {
    validate_branch_name(name)?;

    let path = repo.branches_path().join(name);
    let content = fs::read_to_string(&path)
        .map_err(|e| not_found_or_io(e, &path, || Error::BranchNotFound(name.to_string())))?;

    Hash::from_hex(content.trim()).map_err(|_| {
        Error::CorruptObjectMessage(format!("branch {} does not contain a commit hash", name))
    })
}

/// check if a branch exists
pub fn branch_exists(repo: &Repo, name: &str) -> bool {
    validate_branch_name(name).is_ok() && repo.branches_path().join(name).is_file()
}

/// list all branches, sorted by name
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    let dir = repo.branches_path();
    let mut branches = Vec::new();

    if dir.exists() {
        collect_branches(&dir, &dir, &mut branches)?;
    }

    branches.sort();
    Ok(branches)
}

/// recursively collect branches from directory
fn collect_branches(base: &Path, dir: &Path, branches: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();

        if path.is_dir() {
            collect_branches(base, &path, branches)?;
        } else if path.is_file() {
            if let Ok(rel) = path.strip_prefix(base) {
                branches.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(())
}

/// write HEAD
pub fn write_head(repo: &Repo, head: &Head) -> Result<()> {
    if let Head::Branch(name) = head {
        validate_branch_name(name)?;
    }

    write_atomic(&repo.tmp_path(), &repo.head_path(), format!("{}\n", head).as_bytes())?;

    tracing::info!(%head, "updated HEAD");
    Ok(())
}

/// read HEAD
///
/// a full-length hex hash means detached; anything else is a branch name.
pub fn read_head(repo: &Repo) -> Result<Head> {
    let path = repo.head_path();
    let content = fs::read_to_string(&path).map_err(|e| {
        not_found_or_io(e, &path, || {
            Error::CorruptObjectMessage("HEAD is missing".to_string())
        })
    })?;
    let content = content.trim();

    if looks_like_hash(content) {
        return Ok(Head::Detached(Hash::from_hex(content)?));
    }

    validate_branch_name(content)
        .map_err(|_| Error::CorruptObjectMessage(format!("HEAD is invalid: {:?}", content)))?;
    Ok(Head::Branch(content.to_string()))
}

/// resolve HEAD to the commit it currently designates
pub fn resolve_head(repo: &Repo) -> Result<Hash> {
    match read_head(repo)? {
        Head::Branch(name) => read_branch(repo, &name),
        Head::Detached(hash) => Ok(hash),
    }
}

/// resolve a revision to a commit hash
///
/// accepts `HEAD`, a branch name, a full hash or a unique hash prefix of at
/// least `MIN_PREFIX_LEN` hex chars.
pub fn resolve_rev(repo: &Repo, rev: &str) -> Result<Hash> {
    if rev == "HEAD" {
        return resolve_head(repo);
    }

    if looks_like_hash(rev) {
        return Hash::from_hex(rev);
    }

    if branch_exists(repo, rev) {
        return read_branch(repo, rev);
    }

    if rev.len() >= MIN_PREFIX_LEN && rev.chars().all(|c| c.is_ascii_hexdigit()) {
        return resolve_prefix(repo, &rev.to_ascii_lowercase());
    }

    Err(Error::BranchNotFound(rev.to_string()))
}

/// find the single commit whose hash starts with `prefix`
fn resolve_prefix(repo: &Repo, prefix: &str) -> Result<Hash> {
    let dir = repo.commits_path().join(&prefix[..2]);
    let rest = &prefix[2..];

    let mut matches = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(&dir).with_path(&dir)? {
            let entry = entry.with_path(&dir)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.len() == HASH_HEX_LEN - 2 && name.starts_with(rest) {
                matches.push(format!("{}{}", &prefix[..2], name));
            }
        }
    }

    match matches.as_slice() {
        [] => Err(Error::BranchNotFound(prefix.to_string())),
        [only] => Hash::from_hex(only),
        _ => Err(Error::InvalidArguments(format!(
            "ambiguous commit prefix {} ({} matches)",
            prefix,
            matches.len()
        ))),
    }
}

/// validate branch name
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranch("empty branch name".to_string()));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(Error::InvalidBranch(format!(
            "branch name cannot start or end with '/': {}",
            name
        )));
    }

    if name.contains("//") {
        return Err(Error::InvalidBranch(format!(
            "branch name cannot contain '//': {}",
            name
        )));
    }

    if name.contains('\0') || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidBranch(format!(
            "branch name cannot contain whitespace or null bytes: {:?}",
            name
        )));
    }

    if name == "HEAD" {
        return Err(Error::InvalidBranch("HEAD is reserved".to_string()));
    }

    // HEAD stores either a branch name or a hash; keep them distinguishable
    if looks_like_hash(name) {
        return Err(Error::InvalidBranch(format!(
            "branch name cannot be a full commit hash: {}",
            name
        )));
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidBranch(format!(
                "branch name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}
