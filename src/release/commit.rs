//! `srt commit`: bump the localversion marker and create the release commit

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use super::{parse_release_commit, Session};
use crate::error::{Result, SrtError};
use crate::git::{branch_series, latest_rt_tag, short_branch_name};
use crate::preflight;
use crate::process::{ToolCommand, ToolRunner};
use crate::ui;

/// Overwrite the localversion file with `version`
pub fn localversion_set(path: &Path, version: &str) -> Result<()> {
    debug!("{}: {}", path.display(), version);
    fs::write(path, format!("{}\n", version))?;
    Ok(())
}

/// `-rt38` -> `-rt39\n`
pub fn next_localversion(content: &str) -> Result<String> {
    let line = content.lines().next().unwrap_or_default().trim();
    let number = line
        .strip_prefix("-rt")
        .and_then(|n| n.parse::<u64>().ok())
        .ok_or_else(|| SrtError::config(format!("localversion '{}' is not -rt<N>", line)))?;
    Ok(format!("-rt{}\n", number + 1))
}

pub fn localversion_inc(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    fs::write(path, next_localversion(&content)?)?;
    Ok(())
}

pub fn commit_message(version: &str, rebase: bool) -> String {
    if rebase {
        format!("Linux {} REBASE", version)
    } else {
        format!("Linux {}", version)
    }
}

/// Kernel release of the tree in the runner's directory.
///
/// Builds a defconfig in a scratch output directory; the `+` that marks a
/// tree with uncommitted localversion changes is dropped.
pub fn kernel_version(runner: &dyn ToolRunner) -> Result<String> {
    let build = tempfile::tempdir()?;
    let output = format!("O={}", build.path().display());

    runner.run(&ToolCommand::new("make").args([output.as_str(), "defconfig"]))?;
    let release = runner.run(&ToolCommand::new("make").args(["-s", output.as_str(), "kernelrelease"]))?;

    let release = release.trim();
    Ok(release.strip_suffix('+').unwrap_or(release).to_string())
}

/// `-rtN` marker of the last tag on `base_branch`
fn last_rt_marker(session: &Session, base_branch: &str) -> Result<String> {
    let re = Regex::new(r"(-rt[-a-z0-9]+)$").map_err(|e| SrtError::config(e.to_string()))?;

    let tag = match session.repo.describe(base_branch)? {
        Some(tag) => tag,
        None => {
            warn!("No tag reachable from {}, using the latest -rt tag", base_branch);
            let (major, minor) = branch_series(short_branch_name(base_branch))?;
            latest_rt_tag(&session.repo.list_tags()?, major, minor)
                .map(|t| t.to_string())
                .ok_or_else(|| SrtError::config(format!("no -rt tag on {}", base_branch)))?
        }
    };

    re.captures(&tag)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            SrtError::config(format!(
                "Last tag {} does not end in -rt[0-9]+ on {}",
                tag, base_branch
            ))
        })
}

fn rt_number(marker: &str) -> Result<u64> {
    marker
        .strip_prefix("-rt")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| SrtError::config(format!("{} is not -rt<N>", marker)))
}

pub fn run(session: &Session, rc: Option<u32>) -> Result<()> {
    preflight::into_result(preflight::check_clean(session.repo)?)?;

    let upstream = session.repo.upstream_branch_name()?;
    let rebase = upstream.rsplit('-').next() == Some("rebase");
    let localversion = session.workdir.join(&session.config.localversion);
    let old_head = session.repo.head_commit()?;

    if rebase {
        let base = upstream.trim_end_matches("-rebase");
        let marker = last_rt_marker(session, base)?;
        if parse_release_commit(&session.repo.last_commit_message()?).is_some() {
            session.run(&ToolCommand::git(["reset", "HEAD~"]))?;
        }
        localversion_set(&localversion, &marker)?;
    } else if let Some(rc) = rc {
        let base = upstream.trim_end_matches("-next");
        let rt = rt_number(&last_rt_marker(session, base)?)?;
        localversion_set(&localversion, &format!("-rt{}-rc{}", rt + 1, rc))?;
    } else {
        localversion_inc(&localversion)?;
    }

    let version = kernel_version(session.runner)?;
    let message = commit_message(&version, rebase);

    let commit = ToolCommand::git(["commit", "-s", "-m", message.as_str()])
        .env("GNUPGHOME", session.config.gnupghome());
    ui::display_command(&commit);

    if session.confirm("OK to commit?")? {
        session.run(&ToolCommand::git(["add", session.config.localversion.as_str()]))?;
        session.run(&commit)?;
        ui::display_success(&format!("Committed {}", message));
    } else {
        session.run(&ToolCommand::git(["reset", "--hard", old_head.as_str()]))?;
        ui::display_status("Commit aborted, reset to previous HEAD");
    }
    Ok(())
}
