use std::io::{self, Write};

use anyhow::{bail, Result};
use bstr::{BString, ByteSlice, ByteVec};
use clap::Args;
use tgit_hash::ObjectId;
use tgit_object::Object;
use tgit_repository::Repository;

use super::{open_repo, resolve_object};

#[derive(Args)]
pub struct LsTreeArgs {
    /// Recurse into subtrees
    #[arg(short = 'r')]
    recursive: bool,

    /// Tree to list: a tree or commit id, HEAD, or a ref name
    tree_ish: String,
}

pub fn run(args: &LsTreeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let oid = resolve_object(&repo, &args.tree_ish)?;

    let tree_oid = match repo.store().read(&oid)? {
        Object::Tree(_) => oid,
        Object::Commit(commit) => commit.tree,
        other => bail!(
            "'{}' is a {}, not a tree-ish",
            args.tree_ish,
            other.object_type()
        ),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_tree(&repo, &tree_oid, &BString::from(""), args.recursive, &mut out)?;
    Ok(0)
}

fn print_tree(
    repo: &Repository,
    tree_oid: &ObjectId,
    prefix: &BString,
    recursive: bool,
    out: &mut impl Write,
) -> Result<()> {
    let tree = match repo.store().read(tree_oid)? {
        Object::Tree(t) => t,
        other => bail!("{tree_oid} is a {}, expected tree", other.object_type()),
    };

    for entry in tree.iter() {
        let mut path = prefix.clone();
        if !path.is_empty() {
            path.push_byte(b'/');
        }
        path.extend_from_slice(&entry.name);

        if entry.mode.is_tree() {
            if recursive {
                print_tree(repo, &entry.oid, &path, recursive, out)?;
            } else {
                writeln!(
                    out,
                    "{:06o} tree {}\t{}",
                    entry.mode.raw(),
                    entry.oid,
                    path.as_bstr()
                )?;
            }
        } else {
            writeln!(
                out,
                "{:06o} blob {}\t{}",
                entry.mode.raw(),
                entry.oid,
                path.as_bstr()
            )?;
        }
    }
    Ok(())
}
