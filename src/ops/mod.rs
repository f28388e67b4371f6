//! high-level operations on minigit repositories

mod add;
mod branch;
mod commit;
mod diff;
mod fsck;
mod log;
mod rm;
mod status;

pub use add::add;
pub use branch::{branches, BranchInfo};
pub use commit::commit;
pub use diff::{diff, diff_files};
pub use fsck::{fsck, CorruptObject, FsckReport, MissingObject};
pub use log::{format_timestamp, log, LogEntry};
pub use rm::rm;
pub use status::{status, Status};

use crate::error::Result;
use crate::hash::Hash;
use crate::object::read_commit;
use crate::refs::resolve_head;
use crate::repo::Repo;
use crate::types::Commit;

/// the commit HEAD currently designates, with its hash
pub(crate) fn current_commit(repo: &Repo) -> Result<(Hash, Commit)> {
    let hash = resolve_head(repo)?;
    let commit = read_commit(repo, &hash)?;
    Ok((hash, commit))
}
