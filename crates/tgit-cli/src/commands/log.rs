use std::io::{self, Write};

use anyhow::{bail, Result};
use bstr::ByteSlice;
use clap::Args;
use tgit_object::Object;

use super::open_repo;

#[derive(Args)]
pub struct LogArgs {
    /// Limit the number of commits shown
    #[arg(short = 'n', value_name = "count")]
    max_count: Option<usize>,
}

pub fn run(args: &LogArgs) -> Result<i32> {
    let repo = open_repo()?;
    let Some(mut current) = repo.refs().resolve_head()? else {
        bail!("HEAD does not point at any commit yet");
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut shown = 0usize;

    loop {
        let commit = match repo.store().read(&current)? {
            Object::Commit(c) => c,
            other => bail!("{current} is a {}, expected commit", other.object_type()),
        };

        writeln!(out, "commit {current}")?;
        writeln!(
            out,
            "Author: {} <{}>",
            commit.author.name.as_bstr(),
            commit.author.email.as_bstr()
        )?;
        writeln!(out, "Date:   {}", commit.author.when.format_default())?;
        writeln!(out)?;
        for line in commit.message.lines() {
            writeln!(out, "    {}", line.as_bstr())?;
        }

        shown += 1;
        if args.max_count.is_some_and(|max| shown >= max) {
            break;
        }
        match commit.first_parent() {
            Some(parent) => {
                writeln!(out)?;
                current = *parent;
            }
            None => break,
        }
    }
    Ok(0)
}
