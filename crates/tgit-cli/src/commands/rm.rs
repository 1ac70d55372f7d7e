use std::path::PathBuf;

use anyhow::{bail, Result};
use bstr::{BStr, BString};
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct RmArgs {
    /// Only remove from the index, keep the working tree file
    #[arg(long)]
    cached: bool,

    /// Files to remove
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: &RmArgs) -> Result<i32> {
    let repo = open_repo()?;
    let mut index = repo.load_index()?;

    for path in &args.paths {
        let rel = BString::from(path.to_string_lossy().as_bytes());
        if !index.remove(BStr::new(rel.as_slice())) {
            bail!("pathspec '{}' did not match any staged files", path.display());
        }
        if !args.cached {
            let on_disk = repo.work_tree().join(path);
            if on_disk.is_file() {
                std::fs::remove_file(&on_disk)?;
            }
        }
        println!("rm '{}'", path.display());
    }

    index.write_to(repo.index_path())?;
    Ok(0)
}
