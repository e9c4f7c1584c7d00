//! Main workflow orchestration logic
//!
//! Turns a parsed [`Cli`] into calls of the release stages. Everything
//! with side effects is built here: the repository handle, the
//! configuration section of the checkout and the tool runner.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::{Cli, Command, TagRange};
use crate::config::{self, ReleaseConfig};
use crate::domain::ReleaseContext;
use crate::git::{self, Git2Repository};
use crate::preflight;
use crate::process::SystemRunner;
use crate::release::announce::{self, AnnounceOptions};
use crate::release::{self, commit, create, push, sign, tag, upload, Session};
use crate::ui;

/// Repository, configuration and runner of the current checkout
struct Workspace {
    repo: Git2Repository,
    config: ReleaseConfig,
    runner: SystemRunner,
    workdir: PathBuf,
    assume: Option<bool>,
}

impl Workspace {
    fn open(config_path: Option<&Path>, force: bool) -> Result<Self> {
        let cwd = std::env::current_dir().context("Cannot determine current directory")?;
        let repo = Git2Repository::open(&cwd).context("Not inside a git repository")?;
        let workdir = repo.workdir().unwrap_or(cwd);

        let section = git::config_section_name(&repo)?;
        debug!("Using configuration {}", section);
        let config = config::load_config(config_path, &section)
            .with_context(|| format!("Could not retrieve configuration {}", section))?;

        Ok(Workspace {
            repo,
            config,
            runner: SystemRunner::in_dir(workdir.clone()),
            workdir,
            assume: force.then_some(true),
        })
    }

    fn session(&self) -> Session<'_> {
        Session {
            repo: &self.repo,
            runner: &self.runner,
            config: &self.config,
            workdir: self.workdir.clone(),
            assume: self.assume,
        }
    }

    /// Context for explicit or derived tags
    fn context(&self, range: TagRange) -> Result<ReleaseContext> {
        let (old, new) = release::resolve_tags(&self.repo, range.old_tag, range.new_tag)?;
        checked_context(&old, &new, &self.workdir)
    }
}

fn checked_context(old: &str, new: &str, root: &Path) -> Result<ReleaseContext> {
    let ctx = ReleaseContext::new(old, new, root)?;
    debug!(?ctx);
    Ok(ctx)
}

/// Context for stages that build on tags: all required tags must exist
fn verified_context(workspace: &Workspace, old: &str, new: &str) -> Result<ReleaseContext> {
    let ctx = checked_context(old, new, &workspace.workdir)?;
    let issues = preflight::check_tags(&workspace.repo, &ctx)?;
    for issue in &issues {
        ui::display_issue(issue);
    }
    preflight::into_result(issues)?;
    Ok(ctx)
}

fn review_filter_command() -> Result<String> {
    let exe = std::env::current_exe().context("Cannot locate the srt executable")?;
    Ok(format!("'{}' review-filter", exe.display()))
}

/// `srt review-filter`: rewrite the message on stdin for the tag in
/// `SRT_REVIEW_TAG`
fn review_filter() -> Result<()> {
    let tag = std::env::var(announce::REVIEW_TAG_ENV)
        .with_context(|| format!("{} is not set", announce::REVIEW_TAG_ENV))?;
    let mut message = String::new();
    io::stdin().read_to_string(&mut message)?;
    print!("{}", announce::review_filter(&message, &tag));
    Ok(())
}

/// Run the sub command selected on the command line
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        force,
        config,
        command,
        ..
    } = cli;
    let open = || Workspace::open(config.as_deref(), force);

    match command {
        Command::Commit { release_candidate } => {
            let workspace = open()?;
            commit::run(&workspace.session(), release_candidate)?;
        }
        Command::Tag { release_candidate } => {
            let workspace = open()?;
            tag::run(&workspace.session(), release_candidate)?;
        }
        Command::Create { old_tag, new_tag } => {
            let workspace = open()?;
            let ctx = verified_context(&workspace, &old_tag, &new_tag)?;
            create::run(&workspace.runner, &ctx)?;
        }
        Command::Sign(range) => {
            let workspace = open()?;
            let ctx = workspace.context(range)?;
            sign::run(&workspace.runner, &workspace.config, &ctx)?;
        }
        Command::Upload(range) => {
            let workspace = open()?;
            let ctx = workspace.context(range)?;
            upload::run(&workspace.session(), &ctx)?;
        }
        Command::Push(range) => {
            let workspace = open()?;
            let ctx = workspace.context(range)?;
            push::run(&workspace.session(), &ctx)?;
        }
        Command::Announce {
            old_tag,
            new_tag,
            suppress_cc,
        } => {
            let workspace = open()?;
            let ctx = verified_context(&workspace, &old_tag, &new_tag)?;
            let options = AnnounceOptions {
                suppress_cc,
                review_filter: review_filter_command()?,
            };
            announce::run(&workspace.session(), &ctx, &options)?;
        }
        Command::ReviewFilter => review_filter()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_context_rejects_bad_tag() {
        let err = checked_context("v4.4.115-rt38", "4.4.116-rt39", Path::new("/w")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_review_filter_command_names_subcommand() {
        assert!(review_filter_command().unwrap().ends_with("' review-filter"));
    }
}
