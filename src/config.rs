use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::fs::write_atomic;

/// name of the branch created by `init` unless configured otherwise
pub const DEFAULT_BRANCH: &str = "master";

/// repository configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// branch created at init and pointed at the root commit
    pub default_branch: String,
    /// re-hash objects on read and reject mismatches
    pub verify_objects: bool,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file, replacing it atomically via `tmp_dir`
    pub fn save(&self, tmp_dir: &Path, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_atomic(tmp_dir, path, content.as_bytes())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
            verify_objects: true,
        }
    }
}
