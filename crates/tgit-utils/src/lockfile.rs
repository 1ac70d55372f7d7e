use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::{Result, UtilError};

/// RAII guard for git's lock-file protocol.
///
/// Acquiring creates `<path>.lock` with O_CREAT|O_EXCL; new content is
/// written to the lock file and an explicit [`commit`](LockFile::commit)
/// renames it over the target atomically. Dropping an uncommitted guard
/// removes the lock file (rollback).
#[derive(Debug)]
pub struct LockFile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
}

impl LockFile {
    /// Take the lock for `target`. Fails if another writer holds it.
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let mut lock_path = target.clone().into_os_string();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    UtilError::AlreadyLocked {
                        path: lock_path.clone(),
                    }
                } else {
                    UtilError::Lock {
                        path: lock_path.clone(),
                        source: e,
                    }
                }
            })?;

        Ok(Self {
            target,
            lock_path,
            file: Some(file),
        })
    }

    /// Path of the file the lock protects.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Write content into the lock file.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let file = self.file.as_mut().expect("lock file open until commit");
        file.write_all(data).map_err(|e| UtilError::Lock {
            path: self.lock_path.clone(),
            source: e,
        })
    }

    /// Flush and atomically rename the lock file over the target.
    pub fn commit(mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| UtilError::Lock {
                path: self.lock_path.clone(),
                source: e,
            })?;
            file.sync_all().map_err(|e| UtilError::Lock {
                path: self.lock_path.clone(),
                source: e,
            })?;
        }
        fs::rename(&self.lock_path, &self.target).map_err(|e| UtilError::Lock {
            path: self.lock_path.clone(),
            source: e,
        })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // Uncommitted lock: roll back by removing the lock file.
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("index");
        fs::write(&target, b"old").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"new").unwrap();
        lock.commit().unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!dir.path().join("index.lock").exists());
    }

    #[test]
    fn drop_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("HEAD");

        {
            let mut lock = LockFile::acquire(&target).unwrap();
            lock.write_all(b"abandoned").unwrap();
        }

        assert!(!target.exists());
        assert!(!dir.path().join("HEAD.lock").exists());
    }

    #[test]
    fn second_acquire_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("index");

        let _held = LockFile::acquire(&target).unwrap();
        let err = LockFile::acquire(&target).unwrap_err();
        assert!(matches!(err, UtilError::AlreadyLocked { .. }));
    }
}
