use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::ReleaseContext;
use crate::error::{Result, SrtError};
use crate::git::Repository;

/// Conditions that stop a release stage before it touches anything.
#[derive(Debug, Clone, PartialEq)]
pub enum PreflightIssue {
    /// A tag the stage builds on is missing or not annotated
    MissingTag { tag: String },
    /// An artifact that should have been created is not there
    MissingArtifact { path: PathBuf },
    /// Work tree has uncommitted changes
    DirtyWorkTree,
}

impl fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreflightIssue::MissingTag { tag } => write!(f, "tag {} doesn't exist", tag),
            PreflightIssue::MissingArtifact { path } => write!(
                f,
                "Unable to read {}, did you remember to create?",
                path.display()
            ),
            PreflightIssue::DirtyWorkTree => write!(f, "repo is dirty -> abort"),
        }
    }
}

/// Tags a release from `old` to `new` depends on: both tags, the base of
/// the new tag and, for final releases, its rebase tag.
pub fn required_tags(ctx: &ReleaseContext) -> Result<Vec<String>> {
    let new = &ctx.new.tag;
    let mut tags = vec![ctx.old.tag.to_string(), new.to_string()];
    tags.push(new.base()?);
    if !new.is_release_candidate() {
        tags.push(new.rebase_form());
    }
    Ok(tags)
}

/// Missing tags, in the order of [`required_tags`]
pub fn check_tags(repo: &dyn Repository, ctx: &ReleaseContext) -> Result<Vec<PreflightIssue>> {
    let mut issues = Vec::new();
    for tag in required_tags(ctx)? {
        debug!("Check if tag {} exists", tag);
        if !repo.tag_exists(&tag)? {
            issues.push(PreflightIssue::MissingTag { tag });
        }
    }
    Ok(issues)
}

/// Artifacts of the new release that are not on disk
pub fn check_artifacts(ctx: &ReleaseContext) -> Vec<PreflightIssue> {
    ctx.artifact_files()
        .into_iter()
        .filter(|path| !path.is_file())
        .map(|path| PreflightIssue::MissingArtifact { path })
        .collect()
}

pub fn check_clean(repo: &dyn Repository) -> Result<Vec<PreflightIssue>> {
    if repo.is_dirty()? {
        Ok(vec![PreflightIssue::DirtyWorkTree])
    } else {
        Ok(Vec::new())
    }
}

/// Turns collected issues into an error carrying the first one
pub fn into_result(issues: Vec<PreflightIssue>) -> Result<()> {
    match issues.into_iter().next() {
        None => Ok(()),
        Some(PreflightIssue::MissingArtifact { path }) => Err(SrtError::MissingArtifact(path)),
        Some(issue) => Err(SrtError::preflight(issue.to_string())),
    }
}
