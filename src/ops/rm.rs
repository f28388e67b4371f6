use std::path::Path;

use crate::error::Result;
use crate::index::Index;
use crate::ops::current_commit;
use crate::repo::Repo;

/// stage the removal of a path
///
/// a staged addition is unstaged; a path tracked by HEAD is recorded for
/// removal. the working-tree file is left alone and need not exist. a path
/// that is neither staged nor tracked is a no-op. returns true if the staging
/// area changed.
pub fn rm(repo: &Repo, path: &Path) -> Result<bool> {
    let name = repo.tracked_name(path)?;

    let mut index = Index::load(repo)?;
    let (_, head) = current_commit(repo)?;

    let changed = index.stage_removal(&name, head.files.contains_key(&name));
    if changed {
        index.save(repo)?;
        tracing::info!(path = %name, "staged removal");
    } else {
        tracing::debug!(path = %name, "neither staged nor tracked, nothing to remove");
    }

    Ok(changed)
}
