use std::fs;
use std::path::Path;

use crate::{RepoError, DEFAULT_BRANCH};

/// Create the `.git` skeleton under `path`:
/// HEAD, config, description, objects/, refs/heads/, refs/tags/.
///
/// Re-running on an existing repository is a safe no-op; nothing is
/// overwritten.
pub(crate) fn init_repository(path: &Path) -> Result<(), RepoError> {
    let git_dir = path.join(".git");
    if git_dir.join("HEAD").is_file() {
        log::debug!("reinitializing existing repository at {}", path.display());
        return Ok(());
    }

    fs::create_dir_all(git_dir.join("objects"))?;
    fs::create_dir_all(git_dir.join("refs").join("heads"))?;
    fs::create_dir_all(git_dir.join("refs").join("tags"))?;

    fs::write(
        git_dir.join("HEAD"),
        format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
    )?;
    fs::write(
        git_dir.join("config"),
        "[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n\tbare = false\n",
    )?;
    fs::write(
        git_dir.join("description"),
        "Unnamed repository; edit this file 'description' to name the repository.\n",
    )?;

    Ok(())
}
