use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::{compute_hash, Hash};

/// message of the commit created by `init`
pub const ROOT_MESSAGE: &str = "initial commit";

/// timestamp of the root commit: the unix epoch, shared by every repository
pub const ROOT_TIMESTAMP: i64 = 0;

/// a snapshot: message, time, path -> blob mapping and optional parent
///
/// the canonical encoding is CBOR with fields in declaration order and the
/// file mapping sorted by path (BTreeMap), so equal commits always encode to
/// equal bytes and therefore share a hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// commit message
    pub message: String,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
    /// tracked path -> blob hash
    pub files: BTreeMap<String, Hash>,
    /// parent commit (none for the root commit)
    pub parent: Option<Hash>,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(
        message: impl Into<String>,
        files: BTreeMap<String, Hash>,
        parent: Option<Hash>,
    ) -> Self {
        Self::with_timestamp(message, chrono::Utc::now().timestamp(), files, parent)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        message: impl Into<String>,
        timestamp: i64,
        files: BTreeMap<String, Hash>,
        parent: Option<Hash>,
    ) -> Self {
        Self {
            message: message.into(),
            timestamp,
            files,
            parent,
        }
    }

    /// the root commit every fresh repository starts from
    pub fn root() -> Self {
        Self::with_timestamp(ROOT_MESSAGE, ROOT_TIMESTAMP, BTreeMap::new(), None)
    }

    /// is this an initial commit (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// canonical byte encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes)?;
        Ok(bytes)
    }

    /// decode a commit from its canonical encoding
    ///
    /// anything that does not re-encode to the exact input is rejected, so a
    /// decoded commit always hashes back to the name it was stored under.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let commit: Commit = ciborium::from_reader(bytes)
            .map_err(|e| Error::CorruptObjectMessage(format!("malformed commit: {}", e)))?;

        if commit.to_bytes()? != bytes {
            return Err(Error::CorruptObjectMessage(
                "commit is not in canonical encoding".to_string(),
            ));
        }

        Ok(commit)
    }

    /// content hash of the canonical encoding
    pub fn hash(&self) -> Result<Hash> {
        Ok(compute_hash(&self.to_bytes()?))
    }
}
