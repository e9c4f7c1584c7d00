//! `srt tag`: sign a tag for the release commit at `HEAD`

use super::{parse_release_commit, ReleaseCommit, Session};
use crate::error::{Result, SrtError};
use crate::process::ToolCommand;
use crate::ui;

/// `v<version>` plus `-rebase` for rebase commits and `-rc<N>` for
/// release candidates
pub fn tag_name(commit: &ReleaseCommit, rc: Option<u32>) -> String {
    let mut tag = format!("v{}", commit.version);
    if commit.rebase {
        tag.push_str("-rebase");
    }
    if let Some(rc) = rc {
        tag.push_str(&format!("-rc{}", rc));
    }
    tag
}

pub fn tag_command(key: &str, gnupghome: &str, message: &str, tag: &str) -> ToolCommand {
    ToolCommand::git(["tag", "-s", "-u", key, "-m", message, tag]).env("GNUPGHOME", gnupghome)
}

pub fn run(session: &Session, rc: Option<u32>) -> Result<()> {
    let message = session.repo.last_commit_message()?;
    let commit = parse_release_commit(&message)
        .ok_or_else(|| SrtError::preflight("HEAD is not a release commit"))?;

    let tag = tag_name(&commit, rc);
    let key = session.config.gpg_key_id()?;
    ui::display_status(&format!("tagging as {} with message '{}'", tag, commit.line));

    if session.confirm("OK to tag?")? {
        session.run(&tag_command(key, &session.config.gnupghome(), &commit.line, &tag))?;
        ui::display_success(&format!("Tagged {}", tag));
    }
    Ok(())
}
