//! Release stages
//!
//! A stable -rt release runs through these stages, one `srt` sub command
//! each:
//!
//! 1. [commit] - bump the localversion marker and commit
//! 2. [tag] - sign a tag for the release commit
//! 3. [create] - write patch, series tarball and incremental patch
//! 4. [sign] - detached signatures for the artifacts
//! 5. [upload] - publish artifacts with `kup`
//! 6. [push] - push branch and tags
//! 7. [announce] - mail the review series or print the announcement

pub mod announce;
pub mod commit;
pub mod create;
pub mod push;
pub mod sign;
pub mod tag;
pub mod template;
pub mod upload;

use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::config::ReleaseConfig;
use crate::error::{Result, SrtError};
use crate::git::Repository;
use crate::process::{ToolCommand, ToolRunner};
use crate::ui;

const RELEASE_COMMIT_PATTERN: &str = r"^.*Linux ([0-9.]+[-a-z0-9]+)( REBASE)*";

/// Everything a stage needs to talk to the outside world
pub struct Session<'a> {
    pub repo: &'a dyn Repository,
    pub runner: &'a dyn ToolRunner,
    pub config: &'a ReleaseConfig,
    /// Root of the `patches/` layout and of relative config paths
    pub workdir: PathBuf,
    /// `None` asks on the terminal, `Some(answer)` answers every prompt
    pub assume: Option<bool>,
}

impl Session<'_> {
    /// Ask `prompt` unless the answer was fixed up front
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        match self.assume {
            Some(answer) => {
                debug!("{} -> {}", prompt, answer);
                Ok(answer)
            }
            None => Ok(ui::confirm_action(prompt)?),
        }
    }

    pub fn run(&self, command: &ToolCommand) -> Result<String> {
        self.runner.run(command)
    }
}

/// Version line of a release commit, e.g. `Linux 4.4.115-rt38 REBASE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCommit {
    /// The full matching message line
    pub line: String,
    /// Kernel release without leading `v`, e.g. `4.4.115-rt38`
    pub version: String,
    pub rebase: bool,
}

/// First line of `message` that looks like a release commit subject
pub fn parse_release_commit(message: &str) -> Option<ReleaseCommit> {
    let re = Regex::new(RELEASE_COMMIT_PATTERN).ok()?;
    message.lines().find_map(|line| {
        re.captures(line).map(|caps| ReleaseCommit {
            line: line.to_string(),
            version: caps[1].to_string(),
            rebase: caps.get(2).is_some(),
        })
    })
}

/// Old and new tag for stages that accept them optionally.
///
/// Without explicit tags the new tag is the nearest tag from `HEAD` and the
/// old tag the nearest tag before it.
pub fn resolve_tags(
    repo: &dyn Repository,
    old: Option<String>,
    new: Option<String>,
) -> Result<(String, String)> {
    match (old, new) {
        (Some(old), Some(new)) => Ok((old, new)),
        (None, None) => {
            let new = repo
                .describe("HEAD")?
                .ok_or_else(|| SrtError::preflight("no tag reachable from HEAD"))?;
            let old = repo
                .describe(&format!("{}^", new))?
                .ok_or_else(|| SrtError::preflight(format!("no tag before {}", new)))?;
            debug!("Derived tags {} -> {}", old, new);
            Ok((old, new))
        }
        _ => Err(SrtError::preflight("either both OLD_TAG and NEW_TAG or none")),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Session answering every prompt with `assume`
    pub fn session<'a>(
        repo: &'a dyn Repository,
        runner: &'a dyn ToolRunner,
        config: &'a ReleaseConfig,
        workdir: &std::path::Path,
        assume: bool,
    ) -> Session<'a> {
        Session {
            repo,
            runner,
            config,
            workdir: workdir.to_path_buf(),
            assume: Some(assume),
        }
    }

    pub fn config() -> ReleaseConfig {
        ReleaseConfig {
            gpg_key_id: Some("5D0A306C".to_string()),
            gnupghome: Some("/home/me/.gnupg".to_string()),
            prj_git_tree: Some("git@gitolite.kernel.org:linux-stable-rt".to_string()),
            prj_dir: Some("/pub/linux/kernel/projects/rt/4.4".to_string()),
            mail_to: vec![
                "Foo Bar <foo@bar.barf>".to_string(),
                "example@example.com".to_string(),
            ],
            sender: Some("Mighty Eagle <me@incredible.com>".to_string()),
            name: Some("Mighty Eagle".to_string()),
            section: "rt-repo/origin/v4.4-rt".to_string(),
            ..ReleaseConfig::default()
        }
    }
}
