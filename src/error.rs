use std::path::PathBuf;

use crate::Hash;

/// error type for minigit operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a minigit repository already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("not in an initialized minigit directory: {0}")]
    NotInitialized(PathBuf),

    #[error("file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("no changes added to the commit")]
    NothingToCommit,

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("corrupt object: {0}")]
    CorruptObjectMessage(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("invalid branch name: {0}")]
    InvalidBranch(String),

    #[error("staging area missing at {0}")]
    MissingIndex(PathBuf),

    #[error("path is outside the working directory: {0}")]
    OutsideWorkdir(PathBuf),

    #[error("lock contention on repository")]
    LockContention,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

/// map a read error, turning NotFound into the given domain error
pub(crate) fn not_found_or_io(
    e: std::io::Error,
    path: impl Into<PathBuf>,
    not_found: impl FnOnce() -> Error,
) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        not_found()
    } else {
        Error::Io {
            path: path.into(),
            source: e,
        }
    }
}
