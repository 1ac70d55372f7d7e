pub mod add;
pub mod cat_file;
pub mod clone;
pub mod commit;
pub mod hash_object;
pub mod init;
pub mod log;
pub mod ls_tree;
pub mod rm;
pub mod status;
pub mod write_tree;

use anyhow::{bail, Result};
use clap::Subcommand;
use tgit_hash::ObjectId;
use tgit_ref::RefName;
use tgit_repository::Repository;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init(init::InitArgs),
    /// Compute an object id and optionally store a blob
    HashObject(hash_object::HashObjectArgs),
    /// Show type, size, or content of a repository object
    CatFile(cat_file::CatFileArgs),
    /// List the contents of a tree object
    LsTree(ls_tree::LsTreeArgs),
    /// Write the current index as a tree object
    WriteTree(write_tree::WriteTreeArgs),
    /// Stage file contents in the index
    Add(add::AddArgs),
    /// Remove files from the index
    Rm(rm::RmArgs),
    /// Summarize staged, unstaged, and untracked changes
    Status(status::StatusArgs),
    /// Record the staged tree as a new commit
    Commit(commit::CommitArgs),
    /// Show the commit history of HEAD
    Log(log::LogArgs),
    /// Fetch a remote repository into a new directory
    Clone(clone::CloneArgs),
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init(args) => init::run(args),
        Commands::HashObject(args) => hash_object::run(args),
        Commands::CatFile(args) => cat_file::run(args),
        Commands::LsTree(args) => ls_tree::run(args),
        Commands::WriteTree(args) => write_tree::run(args),
        Commands::Add(args) => add::run(args),
        Commands::Rm(args) => rm::run(args),
        Commands::Status(args) => status::run(args),
        Commands::Commit(args) => commit::run(args),
        Commands::Log(args) => log::run(args),
        Commands::Clone(args) => clone::run(args),
    }
}

/// Open the repository containing the current directory.
pub fn open_repo() -> Result<Repository> {
    Ok(Repository::discover(".")?)
}

/// Resolve a user-supplied object spec: `HEAD`, a full ref name, a full
/// 40-hex id, or a unique hex prefix.
pub fn resolve_object(repo: &Repository, spec: &str) -> Result<ObjectId> {
    if spec == "HEAD" || spec.starts_with("refs/") {
        let name = if spec == "HEAD" {
            RefName::head()
        } else {
            RefName::new(spec)?
        };
        return match repo.refs().resolve(&name)? {
            Some(oid) => Ok(oid),
            None => bail!("ref '{spec}' does not point at any commit yet"),
        };
    }
    if spec.len() == 40 {
        if let Ok(oid) = ObjectId::from_hex(spec) {
            return Ok(oid);
        }
    }
    Ok(repo.store().resolve_prefix(spec)?)
}
