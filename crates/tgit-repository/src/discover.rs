use std::path::{Path, PathBuf};

use crate::RepoError;

/// Walk up from `start` until a directory containing `.git/HEAD` is
/// found. Returns `(git_dir, work_tree)`.
pub(crate) fn find_git_dir(start: &Path) -> Result<(PathBuf, PathBuf), RepoError> {
    let start = start.canonicalize()?;
    let mut current: &Path = &start;
    loop {
        let candidate = current.join(".git");
        if candidate.join("HEAD").is_file() {
            return Ok((candidate, current.to_path_buf()));
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return Err(RepoError::NotARepository(start)),
        }
    }
}
