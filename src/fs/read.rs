use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{not_found_or_io, Error, Result};

/// read a working-tree file, reporting absence as `FileNotFound`
///
/// directories are treated as absent: only regular files can be staged.
pub fn read_working_file(path: &Path) -> Result<Vec<u8>> {
    if path.is_dir() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    fs::read(path).map_err(|e| not_found_or_io(e, path, || Error::FileNotFound(path.to_path_buf())))
}

/// lexically normalize a path, resolving `.` and `..` without touching disk
///
/// used for paths that may no longer exist (staged removals), where
/// `canonicalize` would fail.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
