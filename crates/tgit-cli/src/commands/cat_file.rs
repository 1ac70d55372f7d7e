use std::io::{self, Write};

use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use tgit_object::Object;

use super::{open_repo, resolve_object};

#[derive(Args)]
pub struct CatFileArgs {
    /// Show the object's type
    #[arg(short = 't', conflicts_with_all = ["size", "pretty"])]
    type_only: bool,

    /// Show the object's payload size
    #[arg(short = 's', conflicts_with_all = ["type_only", "pretty"])]
    size: bool,

    /// Pretty-print the object's content
    #[arg(short = 'p', conflicts_with_all = ["type_only", "size"])]
    pretty: bool,

    /// Object to show: full hex id or a unique prefix
    object: String,
}

pub fn run(args: &CatFileArgs) -> Result<i32> {
    let repo = open_repo()?;
    let oid = resolve_object(&repo, &args.object)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.type_only {
        let (obj_type, _) = repo.store().read_header(&oid)?;
        writeln!(out, "{obj_type}")?;
        return Ok(0);
    }
    if args.size {
        let (_, size) = repo.store().read_header(&oid)?;
        writeln!(out, "{size}")?;
        return Ok(0);
    }

    match repo.store().read(&oid)? {
        Object::Blob(blob) => out.write_all(&blob.data)?,
        Object::Tag(tag) => out.write_all(&tag.data)?,
        Object::Commit(commit) => out.write_all(&commit.serialize_payload())?,
        Object::Tree(tree) => {
            for entry in tree.iter() {
                let type_name = if entry.mode.is_tree() { "tree" } else { "blob" };
                writeln!(
                    out,
                    "{:06o} {} {}\t{}",
                    entry.mode.raw(),
                    type_name,
                    entry.oid,
                    entry.name.as_bstr(),
                )?;
            }
        }
    }
    Ok(0)
}
