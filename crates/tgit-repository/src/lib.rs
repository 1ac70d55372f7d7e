//! Repository discovery, initialization, and the central context value.

mod discover;
mod init;
pub mod worktree;

use std::path::{Path, PathBuf};

use tgit_index::Index;
use tgit_loose::LooseObjectStore;
use tgit_ref::RefStore;

/// The default branch name for new and cloned repositories.
pub const DEFAULT_BRANCH: &str = "master";

/// Errors from repository-level operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("repository at {0} has no working tree")]
    NoWorkTree(PathBuf),

    #[error("object {oid} is a {actual}, expected {expected}")]
    WrongObjectType {
        oid: tgit_hash::ObjectId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Loose(#[from] tgit_loose::LooseError),

    #[error(transparent)]
    Ref(#[from] tgit_ref::RefError),

    #[error(transparent)]
    Index(#[from] tgit_index::IndexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One opened repository.
///
/// The git directory and working tree are resolved to absolute paths
/// once at open; everything downstream consults this value instead of
/// global state.
pub struct Repository {
    git_dir: PathBuf,
    work_tree: PathBuf,
    store: LooseObjectStore,
    refs: RefStore,
}

impl Repository {
    /// Open the repository whose working tree root is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_tree = path.as_ref().canonicalize()?;
        let git_dir = work_tree.join(".git");
        if !git_dir.join("HEAD").is_file() {
            return Err(RepoError::NotARepository(work_tree));
        }
        Ok(Self::from_dirs(git_dir, work_tree))
    }

    /// Find the repository containing `start`, walking up the directory
    /// tree.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        let (git_dir, work_tree) = discover::find_git_dir(start.as_ref())?;
        Ok(Self::from_dirs(git_dir, work_tree))
    }

    /// Create a new repository at `path` and open it.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        init::init_repository(path.as_ref())?;
        Self::open(path)
    }

    fn from_dirs(git_dir: PathBuf, work_tree: PathBuf) -> Self {
        let store = LooseObjectStore::open(git_dir.join("objects"));
        let refs = RefStore::open(&git_dir);
        Self {
            git_dir,
            work_tree,
            store,
            refs,
        }
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    pub fn store(&self) -> &LooseObjectStore {
        &self.store
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    /// Load the staging index (empty if none exists yet).
    pub fn load_index(&self) -> Result<Index, RepoError> {
        Ok(Index::read_from(self.index_path())?)
    }
}
