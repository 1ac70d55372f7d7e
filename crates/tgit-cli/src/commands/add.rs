use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use bstr::BString;
use clap::Args;
use tgit_index::{IndexEntry, StatData};
use tgit_object::{FileMode, ObjectType};
use tgit_repository::Repository;

use super::open_repo;

#[derive(Args)]
pub struct AddArgs {
    /// Files or directories to stage
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: &AddArgs) -> Result<i32> {
    let repo = open_repo()?;
    let mut index = repo.load_index()?;

    for path in &args.paths {
        let absolute = path.canonicalize().map_err(|e| {
            anyhow::anyhow!("pathspec '{}' did not match any files: {e}", path.display())
        })?;
        if absolute.is_dir() {
            add_directory(&repo, &mut index, &absolute)?;
        } else {
            add_file(&repo, &mut index, &absolute)?;
        }
    }

    index.write_to(repo.index_path())?;
    Ok(0)
}

fn add_directory(
    repo: &Repository,
    index: &mut tgit_index::Index,
    dir: &Path,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            add_directory(repo, index, &path)?;
        } else {
            add_file(repo, index, &path)?;
        }
    }
    Ok(())
}

fn add_file(repo: &Repository, index: &mut tgit_index::Index, file: &Path) -> Result<()> {
    let rel = match file.strip_prefix(repo.work_tree()) {
        Ok(rel) => rel,
        Err(_) => bail!(
            "'{}' is outside the repository at {}",
            file.display(),
            repo.work_tree().display()
        ),
    };

    let data = std::fs::read(file)?;
    let oid = repo.store().write_raw(ObjectType::Blob, &data)?;

    let metadata = std::fs::metadata(file)?;
    let mode = file_mode(&metadata);

    log::debug!("staging {} as {}", rel.display(), oid);
    index.add(IndexEntry {
        path: BString::from(rel.to_string_lossy().as_bytes()),
        oid,
        mode,
        stat: StatData::from_metadata(&metadata),
    });
    Ok(())
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> FileMode {
    use std::os::unix::fs::PermissionsExt;
    if metadata.permissions().mode() & 0o111 != 0 {
        FileMode::Executable
    } else {
        FileMode::Regular
    }
}

#[cfg(not(unix))]
fn file_mode(_metadata: &std::fs::Metadata) -> FileMode {
    FileMode::Regular
}
