//! the staging area
//!
//! pending additions (path -> full file content) and removals (paths) that
//! the next commit applies on top of its parent's file mapping. persisted as
//! canonical CBOR at `<root>/index` and replaced atomically on every save.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{not_found_or_io, Error, Result};
use crate::fs::write_atomic;
use crate::hash::{compute_hash, Hash};
use crate::repo::Repo;

/// staged file content, encoded as a CBOR byte string
#[derive(Clone, PartialEq, Eq)]
pub struct Content(Vec<u8>);

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Content({} bytes)", self.0.len())
    }
}

impl Serialize for Content {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ContentVisitor;

        impl<'de> Visitor<'de> for ContentVisitor {
            type Value = Content;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte string")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> std::result::Result<Content, E> {
                Ok(Content(v.to_vec()))
            }

            fn visit_byte_buf<E: serde::de::Error>(
                self,
                v: Vec<u8>,
            ) -> std::result::Result<Content, E> {
                Ok(Content(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Content, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Ok(Content(bytes))
            }
        }

        deserializer.deserialize_byte_buf(ContentVisitor)
    }
}

/// the staging area
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    additions: BTreeMap<String, Content>,
    removals: BTreeSet<String>,
}

impl Index {
    /// load the staging area from `<root>/index`
    ///
    /// `init` always writes an empty index, so a missing file means the
    /// repository is damaged rather than freshly created.
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.index_path();
        let bytes = fs::read(&path)
            .map_err(|e| not_found_or_io(e, &path, || Error::MissingIndex(path.clone())))?;
        Self::from_bytes(&bytes)
    }

    /// persist the staging area, atomically replacing the previous file
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let bytes = self.to_bytes()?;
        write_atomic(&repo.tmp_path(), &repo.index_path(), &bytes)?;
        tracing::debug!(
            additions = self.additions.len(),
            removals = self.removals.len(),
            "saved staging area"
        );
        Ok(())
    }

    /// canonical byte encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes)?;
        Ok(bytes)
    }

    /// decode from canonical encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes)
            .map_err(|e| Error::CorruptObjectMessage(format!("malformed staging area: {}", e)))
    }

    /// stage `content` for `path`
    ///
    /// the baseline is the content already staged for `path`, or, when
    /// nothing is staged, the blob `tracked` in the current commit. matching
    /// the baseline leaves the index untouched, including any pending removal
    /// of `path`. new content replaces the staged entry and cancels a pending
    /// removal.
    ///
    /// returns true if the index changed.
    pub fn stage_addition(&mut self, path: &str, content: &[u8], tracked: Option<&Hash>) -> bool {
        let unchanged = match self.additions.get(path) {
            Some(staged) => staged.as_bytes() == content,
            None => tracked == Some(&compute_hash(content)),
        };
        if unchanged {
            return false;
        }

        self.removals.remove(path);
        self.additions.insert(path.to_string(), Content(content.to_vec()));
        true
    }

    /// stage the removal of `path`
    ///
    /// a staged addition is simply dropped; otherwise a tracked path is
    /// recorded for removal. a path that is neither staged nor tracked is a
    /// no-op. returns true if the index changed.
    pub fn stage_removal(&mut self, path: &str, tracked: bool) -> bool {
        if self.additions.remove(path).is_some() {
            return true;
        }
        if tracked {
            return self.removals.insert(path.to_string());
        }
        false
    }

    /// true iff nothing is staged
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// drop all staged changes
    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
    }

    /// staged additions, sorted by path
    pub fn additions(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.additions.iter().map(|(p, c)| (p.as_str(), c.as_bytes()))
    }

    /// staged removals, sorted by path
    pub fn removals(&self) -> impl Iterator<Item = &str> {
        self.removals.iter().map(String::as_str)
    }

    /// staged content for a path, if any
    pub fn staged(&self, path: &str) -> Option<&[u8]> {
        self.additions.get(path).map(Content::as_bytes)
    }

    /// is `path` staged for removal
    pub fn is_removed(&self, path: &str) -> bool {
        self.removals.contains(path)
    }
}
