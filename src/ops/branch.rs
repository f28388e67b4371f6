use crate::error::Result;
use crate::hash::Hash;
use crate::refs::{list_branches, read_branch, read_head, Head};
use crate::repo::Repo;

/// a branch with the commit it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub hash: Hash,
    /// HEAD is attached to this branch
    pub active: bool,
}

impl std::fmt::Display for BranchInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.active { '*' } else { ' ' };
        write!(f, "{} {} {}", marker, self.name, self.hash.short())
    }
}

/// list branches sorted by name, marking the one HEAD is attached to
pub fn branches(repo: &Repo) -> Result<Vec<BranchInfo>> {
    let active = match read_head(repo)? {
        Head::Branch(name) => Some(name),
        Head::Detached(_) => None,
    };

    list_branches(repo)?
        .into_iter()
        .map(|name| {
            let hash = read_branch(repo, &name)?;
            let is_active = active.as_deref() == Some(name.as_str());
            Ok(BranchInfo {
                name,
                hash,
                active: is_active,
            })
        })
        .collect()
}
