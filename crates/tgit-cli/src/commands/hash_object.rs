use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tgit_hash::Hasher;
use tgit_object::ObjectType;

use super::open_repo;

#[derive(Args)]
pub struct HashObjectArgs {
    /// Actually write the object into the object database
    #[arg(short = 'w')]
    write: bool,

    /// File to hash
    file: PathBuf,
}

pub fn run(args: &HashObjectArgs) -> Result<i32> {
    let data = std::fs::read(&args.file)?;

    let oid = if args.write {
        let repo = open_repo()?;
        repo.store().write_raw(ObjectType::Blob, &data)?
    } else {
        Hasher::hash_object(ObjectType::Blob.as_str(), &data)
    };

    println!("{oid}");
    Ok(0)
}
