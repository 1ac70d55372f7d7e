use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tgit_repository::Repository;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    directory: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<i32> {
    let path = match &args.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => PathBuf::from("."),
    };
    let repo = Repository::init(&path)?;
    println!(
        "Initialized empty Git repository in {}",
        repo.git_dir().display()
    );
    Ok(0)
}
