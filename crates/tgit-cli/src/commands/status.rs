use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::{bail, Result};
use bstr::{BStr, BString, ByteSlice, ByteVec};
use clap::Args;
use tgit_hash::{Hasher, ObjectId};
use tgit_object::Object;
use tgit_repository::{worktree, Repository};

use super::open_repo;

#[derive(Args)]
pub struct StatusArgs {}

pub fn run(_args: &StatusArgs) -> Result<i32> {
    let repo = open_repo()?;
    let index = repo.load_index()?;

    let head_files = head_tree_files(&repo)?;

    // Index vs HEAD: what the next commit would change.
    let mut staged: Vec<(&'static str, BString)> = Vec::new();
    for entry in index.iter() {
        match head_files.get(&entry.path) {
            None => staged.push(("new file", entry.path.clone())),
            Some(oid) if *oid != entry.oid => staged.push(("modified", entry.path.clone())),
            Some(_) => {}
        }
    }
    for path in head_files.keys() {
        if index.get(path.as_bstr()).is_none() {
            staged.push(("deleted", path.clone()));
        }
    }
    staged.sort_by(|a, b| a.1.cmp(&b.1));

    // Working tree vs index: local edits not yet staged.
    let mut unstaged: Vec<(&'static str, BString)> = Vec::new();
    for entry in index.iter() {
        let on_disk = repo.work_tree().join(entry.path.to_str_lossy().as_ref());
        let metadata = match std::fs::metadata(&on_disk) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                unstaged.push(("deleted", entry.path.clone()));
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if entry.stat.matches(&metadata) {
            continue;
        }
        let data = std::fs::read(&on_disk)?;
        if Hasher::hash_object("blob", &data) != entry.oid {
            unstaged.push(("modified", entry.path.clone()));
        }
    }

    // Working tree files the index has never seen.
    let untracked: Vec<BString> = worktree::list_files(&repo)?
        .into_iter()
        .filter(|path| index.get(path.as_bstr()).is_none())
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match repo.refs().head_branch()? {
        Some(branch) => writeln!(
            out,
            "On branch {}",
            branch.branch_name().unwrap_or("HEAD")
        )?,
        None => writeln!(out, "HEAD detached")?,
    }

    if !staged.is_empty() {
        writeln!(out, "\nChanges to be committed:")?;
        for (label, path) in &staged {
            writeln!(out, "\t{label}:   {}", path.as_bstr())?;
        }
    }
    if !unstaged.is_empty() {
        writeln!(out, "\nChanges not staged for commit:")?;
        for (label, path) in &unstaged {
            writeln!(out, "\t{label}:   {}", path.as_bstr())?;
        }
    }
    if !untracked.is_empty() {
        writeln!(out, "\nUntracked files:")?;
        for path in &untracked {
            writeln!(out, "\t{}", path.as_bstr())?;
        }
    }
    if staged.is_empty() && unstaged.is_empty() && untracked.is_empty() {
        writeln!(out, "nothing to commit, working tree clean")?;
    }

    Ok(0)
}

/// Flatten the HEAD commit's tree into a path-to-blob map.
fn head_tree_files(repo: &Repository) -> Result<HashMap<BString, ObjectId>> {
    let mut files = HashMap::new();
    let Some(head) = repo.refs().resolve_head()? else {
        return Ok(files);
    };
    let tree = match repo.store().read(&head)? {
        Object::Commit(c) => c.tree,
        other => bail!("HEAD is a {}, expected commit", other.object_type()),
    };
    collect_tree(repo, &tree, BStr::new(""), &mut files)?;
    Ok(files)
}

fn collect_tree(
    repo: &Repository,
    tree_oid: &ObjectId,
    prefix: &BStr,
    out: &mut HashMap<BString, ObjectId>,
) -> Result<()> {
    let tree = match repo.store().read(tree_oid)? {
        Object::Tree(t) => t,
        other => bail!("{tree_oid} is a {}, expected tree", other.object_type()),
    };
    for entry in tree.iter() {
        let mut path = BString::from(prefix.as_bytes());
        if !path.is_empty() {
            path.push_byte(b'/');
        }
        path.extend_from_slice(&entry.name);

        if entry.mode.is_tree() {
            collect_tree(repo, &entry.oid, path.as_bstr(), out)?;
        } else {
            out.insert(path, entry.oid);
        }
    }
    Ok(())
}
