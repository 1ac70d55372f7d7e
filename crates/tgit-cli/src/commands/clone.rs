use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tgit_protocol::fetch;
use tgit_ref::RefName;
use tgit_repository::{worktree, Repository, DEFAULT_BRANCH};
use tgit_transport::{Credentials, HttpClient};

#[derive(Args)]
pub struct CloneArgs {
    /// Check out this branch instead of the remote master
    #[arg(short, long, value_name = "name")]
    branch: Option<String>,

    /// Repository URL (http or https)
    repository: String,

    /// Destination directory
    dest_dir: Option<PathBuf>,
}

pub fn run(args: &CloneArgs) -> Result<i32> {
    let dest = match &args.dest_dir {
        Some(dir) => dir.clone(),
        None => infer_directory(&args.repository)?,
    };
    if dest.exists() && std::fs::read_dir(&dest)?.next().is_some() {
        bail!(
            "destination path '{}' already exists and is not an empty directory",
            dest.display()
        );
    }

    // Fail on missing credentials before creating anything.
    let credentials = Credentials::from_env()?;
    let http = HttpClient::new(&args.repository, credentials)?;
    let branch = args.branch.as_deref().unwrap_or(DEFAULT_BRANCH);

    let stderr = io::stderr();
    let mut err = stderr.lock();
    writeln!(err, "Cloning into '{}'...", dest.display())?;

    std::fs::create_dir_all(&dest)?;
    let repo = Repository::init(&dest)?;

    let outcome = fetch::fetch_branch(&http, repo.store(), branch)?;
    writeln!(
        err,
        "Received {} object(s), {} delta(s) resolved",
        outcome.pack.object_count, outcome.pack.deltas_resolved
    )?;

    let branch_ref = RefName::branch(branch)?;
    repo.refs().write_symbolic(&RefName::head(), &branch_ref)?;
    repo.refs().write(&branch_ref, &outcome.tip)?;
    append_remote_config(&repo, &args.repository)?;

    worktree::checkout_commit(&repo, &outcome.tip)?;
    Ok(0)
}

/// Take the last URL segment and drop a `.git` suffix.
fn infer_directory(url: &str) -> Result<PathBuf> {
    let name = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .trim_end_matches(".git");
    if name.is_empty() {
        bail!("cannot infer a directory name from '{url}'");
    }
    Ok(PathBuf::from(name))
}

fn append_remote_config(repo: &Repository, url: &str) -> Result<()> {
    let config_path = repo.git_dir().join("config");
    let mut content = std::fs::read_to_string(&config_path).unwrap_or_default();
    content.push_str(&format!(
        "\n[remote \"origin\"]\n\turl = {url}\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n"
    ));
    std::fs::write(&config_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_inferred_from_url() {
        assert_eq!(
            infer_directory("https://example.com/team/project.git").unwrap(),
            PathBuf::from("project")
        );
        assert_eq!(
            infer_directory("https://example.com/solo").unwrap(),
            PathBuf::from("solo")
        );
        assert_eq!(
            infer_directory("https://example.com/trailing/").unwrap(),
            PathBuf::from("trailing")
        );
    }
}
