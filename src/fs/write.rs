use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// atomically replace `target` with `content`
///
/// writes to a uniquely named file under `tmp_dir`, fsyncs it, renames it over
/// the target and fsyncs the target's directory. readers see either the old
/// content or the new content, never a truncated file. `tmp_dir` must live on
/// the same filesystem as `target`.
pub fn write_atomic(tmp_dir: &Path, target: &Path, content: &[u8]) -> Result<()> {
    // ensure parent directories exist
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let tmp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(content).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    if let Err(e) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_path(target);
    }

    if let Some(parent) = target.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// fsync a directory so a rename inside it is durable
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}
