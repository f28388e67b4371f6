use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_commit;
use crate::refs::resolve_rev;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// get commit history starting at a revision, newest first
///
/// history is a single parent chain, so this walks parents until the root.
pub fn log(repo: &Repo, rev: &str, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let mut next = Some(resolve_rev(repo, rev)?);
    let mut entries = Vec::new();
    let mut visited = HashSet::new();

    while let Some(hash) = next {
        if let Some(max) = max_count {
            if entries.len() >= max {
                break;
            }
        }

        // a cycle can only come from tampered objects
        if !visited.insert(hash) {
            return Err(Error::CorruptObjectMessage(format!(
                "commit {} is its own ancestor",
                hash
            )));
        }

        let commit = read_commit(repo, &hash)?;
        next = commit.parent;
        entries.push(LogEntry { hash, commit });
    }

    Ok(entries)
}

/// format a log entry for display
impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "commit {}", self.hash)?;
        writeln!(f, "Date:   {}", format_timestamp(self.commit.timestamp))?;

        writeln!(f)?;
        for line in self.commit.message.lines() {
            writeln!(f, "    {}", line)?;
        }

        Ok(())
    }
}

/// render a unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`
///
/// timestamps chrono cannot represent are shown as raw seconds.
pub fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
