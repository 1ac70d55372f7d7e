use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct WriteTreeArgs {}

pub fn run(_args: &WriteTreeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let index = repo.load_index()?;
    let tree_oid = index.write_tree(repo.store())?;
    println!("{tree_oid}");
    Ok(0)
}
