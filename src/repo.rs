use std::fs::File;
use std::path::{Component, Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::config::Config;
use crate::error::{not_found_or_io, Error, IoResultExt, Result};
use crate::fs::{fsync_dir, normalize_path};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::write_commit;
use crate::refs::{write_branch, write_head, Head};
use crate::types::Commit;

/// name of the repository directory inside the working directory
pub const REPO_DIR: &str = ".minigit";

/// true for `.minigit` and the sibling `init` builds it in
pub(crate) fn is_store_dir(name: &str) -> bool {
    name == REPO_DIR || name.starts_with(STAGING_PREFIX)
}

const STAGING_PREFIX: &str = ".minigit.tmp-";

/// a minigit repository: a working directory plus its `.minigit` store
///
/// every path the library touches is derived from this handle.
pub struct Repo {
    workdir: PathBuf,
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository in the given working directory
    pub fn init(workdir: &Path) -> Result<Self> {
        Self::init_with_config(workdir, Config::default())
    }

    /// initialize a new repository with an explicit configuration
    ///
    /// the directory layout, root commit, default branch, HEAD and empty
    /// staging area are built in a uniquely named sibling of `.minigit` and
    /// renamed into place last. a failure removes the sibling, so there is
    /// never a half-built `.minigit`.
    pub fn init_with_config(workdir: &Path, config: Config) -> Result<Self> {
        let workdir = workdir.canonicalize().with_path(workdir)?;
        let path = workdir.join(REPO_DIR);
        if path.exists() {
            return Err(Error::AlreadyInitialized(path));
        }

        let staging = Self {
            path: workdir.join(format!("{}{}", STAGING_PREFIX, uuid::Uuid::new_v4())),
            workdir,
            config,
        };

        let root_hash = match staging.build_layout() {
            Ok(hash) => hash,
            Err(e) => {
                let _ = std::fs::remove_dir_all(&staging.path);
                return Err(e);
            }
        };

        if let Err(e) = std::fs::rename(&staging.path, &path) {
            let _ = std::fs::remove_dir_all(&staging.path);
            if path.exists() {
                return Err(Error::AlreadyInitialized(path));
            }
            return Err(e).with_path(&path);
        }
        fsync_dir(&staging.workdir)?;

        let repo = Self { path, ..staging };
        tracing::info!(path = %repo.path.display(), root = %root_hash, "initialized repository");
        Ok(repo)
    }

    /// write a fresh store under `self.path`, returning the root commit hash
    fn build_layout(&self) -> Result<Hash> {
        for dir in [
            self.blobs_path(),
            self.commits_path(),
            self.branches_path(),
            self.tmp_path(),
        ] {
            std::fs::create_dir_all(&dir).with_path(&dir)?;
        }
        self.config.save(&self.tmp_path(), &self.config_path())?;

        let root_hash = write_commit(self, &Commit::root())?;
        write_branch(self, &self.config.default_branch, &root_hash)?;
        write_head(self, &Head::Branch(self.config.default_branch.clone()))?;
        Index::default().save(self)?;

        Ok(root_hash)
    }

    /// open an existing repository rooted at the given working directory
    pub fn open(workdir: &Path) -> Result<Self> {
        let workdir = canonical_workdir(workdir)?;
        let path = workdir.join(REPO_DIR);
        let config_path = path.join("config.toml");
        if !config_path.is_file() {
            return Err(Error::NotInitialized(workdir));
        }

        let config = Config::load(&config_path)?;

        Ok(Self {
            workdir,
            path,
            config,
        })
    }

    /// find the repository containing `start`, searching parent directories
    pub fn discover(start: &Path) -> Result<Self> {
        let start = canonical_workdir(start)?;
        for dir in start.ancestors() {
            if dir.join(REPO_DIR).join("config.toml").is_file() {
                return Self::open(dir);
            }
        }
        Err(Error::NotInitialized(start))
    }

    /// working directory the repository tracks
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// repository root path (the `.minigit` directory)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to blobs directory
    pub fn blobs_path(&self) -> PathBuf {
        self.objects_path().join("blobs")
    }

    /// path to commits directory
    pub fn commits_path(&self) -> PathBuf {
        self.objects_path().join("commits")
    }

    /// path to branches directory
    pub fn branches_path(&self) -> PathBuf {
        self.path.join("refs/branches")
    }

    /// path to HEAD
    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    /// path to the staging area
    pub fn index_path(&self) -> PathBuf {
        self.path.join("index")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".lock")
    }

    /// resolve a working-tree path to the name it is tracked under
    ///
    /// relative paths are taken relative to the working directory. the result
    /// uses `/` separators and never escapes the working directory or points
    /// into `.minigit`.
    pub fn tracked_name(&self, path: &Path) -> Result<String> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        };
        let normalized = normalize_path(&joined);

        // resolve symlinked parents so absolute paths compare against the
        // canonical working directory
        let resolved = match (normalized.parent(), normalized.file_name()) {
            (Some(parent), Some(file)) => parent
                .canonicalize()
                .map(|p| p.join(file))
                .unwrap_or_else(|_| normalized.clone()),
            _ => normalized.clone(),
        };

        let rel = resolved
            .strip_prefix(&self.workdir)
            .map_err(|_| Error::OutsideWorkdir(path.to_path_buf()))?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => parts.push(part.to_string()),
                    None => {
                        return Err(Error::InvalidArguments(format!(
                            "path is not valid UTF-8: {}",
                            path.display()
                        )))
                    }
                },
                _ => return Err(Error::OutsideWorkdir(path.to_path_buf())),
            }
        }

        match parts.first() {
            None => Err(Error::InvalidArguments(format!(
                "not a file: {}",
                path.display()
            ))),
            Some(first) if is_store_dir(first) => Err(Error::InvalidArguments(format!(
                "cannot track repository internals: {}",
                path.display()
            ))),
            Some(_) => Ok(parts.join("/")),
        }
    }

    /// working-tree location of a tracked name
    pub fn working_path(&self, name: &str) -> PathBuf {
        self.workdir.join(name)
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }

    /// try to acquire exclusive lock, returning None if already locked
    pub fn try_lock(&self) -> Result<Option<RepoLock>> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(RepoLock { flock })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err(_) => Err(Error::LockContention),
        }
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}
// lock is released automatically when Flock is dropped

fn canonical_workdir(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|e| not_found_or_io(e, path, || Error::NotInitialized(path.to_path_buf())))
}
