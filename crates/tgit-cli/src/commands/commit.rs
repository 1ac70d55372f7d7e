use anyhow::{bail, Context, Result};
use bstr::BString;
use clap::Args;
use tgit_object::{Commit, Object};
use tgit_ref::RefName;
use tgit_utils::date::{GitTime, Signature};

use super::open_repo;

#[derive(Args)]
pub struct CommitArgs {
    /// Commit message
    #[arg(short = 'm', value_name = "msg")]
    message: String,
}

pub fn run(args: &CommitArgs) -> Result<i32> {
    let repo = open_repo()?;

    let index = repo.load_index()?;
    if index.is_empty() {
        bail!("nothing staged; use 'tgit add' first");
    }
    let tree = index.write_tree(repo.store())?;

    let parent = repo.refs().resolve_head()?;
    if let Some(parent_oid) = parent {
        // Committing the identical tree again would record an empty change.
        if let Object::Commit(parent_commit) = repo.store().read(&parent_oid)? {
            if parent_commit.tree == tree {
                bail!("nothing to commit, working tree clean");
            }
        }
    }

    let author = identity_from_env()?;
    let commit = Commit {
        tree,
        parents: parent.into_iter().collect(),
        committer: author.clone(),
        author,
        message: BString::from(args.message.as_str()),
    };
    let oid = repo.store().write(&Object::Commit(commit.clone()))?;

    let (ref_label, target) = match repo.refs().head_branch()? {
        Some(branch) => {
            let label = branch.branch_name().unwrap_or("HEAD").to_string();
            (label, branch)
        }
        None => ("detached HEAD".to_string(), RefName::head()),
    };
    repo.refs().write(&target, &oid)?;

    let root_note = if commit.is_root() { " (root-commit)" } else { "" };
    println!("[{}{}] {} {}", ref_label, root_note, &oid.to_hex()[..7], commit.summary());
    Ok(0)
}

/// Author identity from GIT_AUTHOR_NAME / GIT_AUTHOR_EMAIL.
fn identity_from_env() -> Result<Signature> {
    let name = std::env::var("GIT_AUTHOR_NAME")
        .context("author unknown: set GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL")?;
    let email = std::env::var("GIT_AUTHOR_EMAIL")
        .context("author unknown: set GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL")?;
    Ok(Signature {
        name: BString::from(name),
        email: BString::from(email),
        when: GitTime::now(),
    })
}
