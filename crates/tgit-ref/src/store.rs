use std::fs;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use tgit_hash::ObjectId;
use tgit_utils::lockfile::LockFile;

use crate::{RefError, RefName, Reference};

/// How many symbolic hops `resolve` follows before giving up.
const MAX_SYMBOLIC_DEPTH: usize = 10;

/// Loose reference storage under a `.git` directory.
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn open(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    fn ref_path(&self, name: &RefName) -> PathBuf {
        self.git_dir.join(name.as_str())
    }

    /// Read one ref file. `None` when the file does not exist.
    pub fn read(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        let path = self.ref_path(name);
        let contents = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RefError::Io(e)),
        };

        let trimmed = contents.trim();
        if let Some(target) = trimmed.strip_prefix(b"ref: ") {
            let target = std::str::from_utf8(target.trim()).map_err(|_| RefError::Malformed {
                name: name.to_string(),
                reason: "non-UTF-8 symbolic target".into(),
            })?;
            return Ok(Some(Reference::Symbolic(RefName::new(target)?)));
        }

        let hex = std::str::from_utf8(trimmed).map_err(|_| RefError::Malformed {
            name: name.to_string(),
            reason: "non-UTF-8 object id".into(),
        })?;
        let oid = ObjectId::from_hex(hex).map_err(|e| RefError::Malformed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Reference::Direct(oid)))
    }

    /// Resolve a ref to an object id, following symbolic hops.
    /// `None` when the chain ends at a ref file that does not exist yet
    /// (an unborn branch).
    pub fn resolve(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        let mut current = name.clone();
        for _ in 0..MAX_SYMBOLIC_DEPTH {
            match self.read(&current)? {
                None => return Ok(None),
                Some(Reference::Direct(oid)) => return Ok(Some(oid)),
                Some(Reference::Symbolic(target)) => current = target,
            }
        }
        Err(RefError::ChainTooDeep(name.to_string()))
    }

    /// Write a direct ref: the 40-hex id, no trailing newline.
    pub fn write(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        let path = self.ref_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut lock = LockFile::acquire(&path)?;
        lock.write_all(oid.to_hex().as_bytes())?;
        lock.commit()?;
        Ok(())
    }

    /// Write a symbolic ref: `ref: <target>` with a trailing newline.
    pub fn write_symbolic(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        let path = self.ref_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut lock = LockFile::acquire(&path)?;
        lock.write_all(format!("ref: {target}\n").as_bytes())?;
        lock.commit()?;
        Ok(())
    }

    /// Read HEAD.
    pub fn head(&self) -> Result<Option<Reference>, RefError> {
        self.read(&RefName::head())
    }

    /// Resolve HEAD to an object id (`None` for an unborn branch).
    pub fn resolve_head(&self) -> Result<Option<ObjectId>, RefError> {
        self.resolve(&RefName::head())
    }

    /// The branch HEAD points at, if it is symbolic onto refs/heads.
    pub fn head_branch(&self) -> Result<Option<RefName>, RefError> {
        match self.head()? {
            Some(Reference::Symbolic(target)) if target.branch_name().is_some() => {
                Ok(Some(target))
            }
            _ => Ok(None),
        }
    }
}
