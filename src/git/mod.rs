//! Git operations abstraction layer
//!
//! Read-only queries the release stages need (branch names, tag existence,
//! dirty state, HEAD message) go through the [Repository] trait:
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! Operations that sign, rewrite or talk to remotes are run through the
//! `git` command line (see [crate::process]) so that the user's gpg agent,
//! hooks and credentials apply.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::Path;

use crate::domain::Tag;
use crate::error::{Result, SrtError};

/// Read-only repository queries used by the release workflow
///
/// ## Error Handling
///
/// Implementations map their underlying errors (like `git2::Error`) to
/// [crate::error::SrtError].
pub trait Repository {
    /// URL of the named remote
    fn remote_url(&self, remote: &str) -> Result<String>;

    /// Short name of the checked out branch, e.g. `v4.4-rt`
    fn local_branch_name(&self) -> Result<String>;

    /// Upstream of the checked out branch, e.g. `origin/v4.4-rt`
    fn upstream_branch_name(&self) -> Result<String>;

    /// True if `tag` exists as an annotated tag (`<tag>^{tag}` resolves)
    fn tag_exists(&self, tag: &str) -> Result<bool>;

    /// True if the work tree has staged, unstaged or untracked changes
    fn is_dirty(&self) -> Result<bool>;

    /// Full hash of the HEAD commit
    fn head_commit(&self) -> Result<String>;

    /// Message of the HEAD commit
    fn last_commit_message(&self) -> Result<String>;

    /// All tag names
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Nearest tag reachable from `rev`, `None` if there is none
    fn describe(&self, rev: &str) -> Result<Option<String>>;
}

/// Repository name from a remote URL, e.g.
/// `git@host:rt/linux-stable-rt.git` -> `linux-stable-rt`
pub fn remote_repo_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let base = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| base.to_string())
}

/// `origin/v4.4-rt` -> `v4.4-rt`
pub fn short_branch_name(upstream: &str) -> &str {
    upstream
        .split_once('/')
        .map(|(_, branch)| branch)
        .unwrap_or(upstream)
}

/// `<repo>/<upstream-branch>` key of the configuration section for this
/// checkout
pub fn config_section_name(repo: &dyn Repository) -> Result<String> {
    let url = repo.remote_url("origin")?;
    let branch = repo.upstream_branch_name()?;
    Ok(format!("{}/{}", remote_repo_name(&url), branch))
}

/// `(major, minor)` of a stable -rt branch such as `v4.4-rt`,
/// `v4.4-rt-rebase` or `v4.4-rt-next`
pub fn branch_series(branch: &str) -> Result<(u64, u64)> {
    let version = branch
        .strip_prefix('v')
        .and_then(|rest| rest.split('-').next())
        .ok_or_else(|| SrtError::config(format!("cannot derive version from branch {}", branch)))?;

    let (major, minor) = version
        .split_once('.')
        .ok_or_else(|| SrtError::config(format!("cannot derive version from branch {}", branch)))?;

    let parse = |s: &str| {
        s.parse::<u64>()
            .map_err(|_| SrtError::config(format!("cannot derive version from branch {}", branch)))
    };
    Ok((parse(major)?, parse(minor)?))
}

/// Highest final `-rt` tag of the `major.minor` series.
///
/// Release candidates and tags that do not parse (e.g. `-rebase` tags) are
/// skipped. Ordered by patch level, then rt number.
pub fn latest_rt_tag(tags: &[String], major: u64, minor: u64) -> Option<Tag> {
    tags.iter()
        .filter_map(|t| Tag::parse(t).ok())
        .filter(|t| t.major == major && t.minor == minor)
        .filter(|t| !t.is_release_candidate())
        .filter_map(|t| t.get("rt").map(|rt| (t.patch, rt, t)))
        .max_by_key(|(patch, rt, _)| (*patch, *rt))
        .map(|(_, _, tag)| tag)
}
