//! `srt announce`: mail a release candidate for review or print the
//! announcement of a final release

use std::fs;
use std::path::Path;

use chrono::{Duration, Local, Utc};
use tracing::{debug, info};

use super::template::{self, Replacements};
use super::Session;
use crate::domain::ReleaseContext;
use crate::error::Result;
use crate::git::short_branch_name;
use crate::process::ToolCommand;
use crate::ui;

/// Environment variable carrying the new tag to `srt review-filter`
pub const REVIEW_TAG_ENV: &str = "SRT_REVIEW_TAG";

const TMP_BRANCH: &str = "next-tmp";
const COVER_LETTER: &str = "0000-cover-letter.patch";
const SUBJECT_MARKER: &str = "*** SUBJECT HERE ***";
const BLURB_MARKER: &str = "*** BLURB HERE ***";

/// Options of the announce stage
#[derive(Debug, Clone, Default)]
pub struct AnnounceOptions {
    /// Don't auto-cc anyone
    pub suppress_cc: bool,
    /// Command line git runs as message filter, e.g. `'/usr/bin/srt' review-filter`
    pub review_filter: String,
}

/// A fresh `Message-ID` value, `<time.pid@domain>` with the domain taken
/// from the sender address
pub fn message_id(sender: &str) -> String {
    let domain = sender
        .rsplit_once('@')
        .map(|(_, d)| d.trim_end_matches('>'))
        .filter(|d| !d.is_empty())
        .unwrap_or("localhost");
    let now = Utc::now();
    format!(
        "<{}.{}.{}@{}>",
        now.format("%Y%m%d%H%M%S"),
        now.timestamp_subsec_nanos(),
        std::process::id(),
        domain
    )
}

/// Values shared by the announcement and the review cover letter
pub fn replacements(session: &Session, ctx: &ReleaseContext) -> Result<Replacements<'static>> {
    let config = session.config;
    let new = &ctx.new.tag;
    let old = &ctx.old;
    let sender = config.sender()?;

    let mut r = Replacements::new();
    r.insert("mail_to", config.mail_to()?.join(", "));
    r.insert("major", new.major.to_string());
    r.insert("minor", new.minor.to_string());
    r.insert("patch", new.patch.to_string());
    r.insert("new_version", ctx.new.short_tag.clone());
    r.insert("old_version", old.short_tag.clone());
    r.insert("prj_dir", config.prj_dir()?.to_string());
    r.insert("message_id", message_id(sender));
    r.insert("sender", sender.to_string());
    r.insert("name", config.name()?.to_string());
    r.insert("new_tag_rt", new.component("rt")?.to_string());
    if ctx.is_release_candidate() {
        r.insert("new_tag_rc", new.component("rc")?.to_string());
    }
    Ok(r)
}

/// Commit message rewritten for the review series: the review banner goes
/// between the subject and the body
pub fn review_filter(message: &str, tag: &str) -> String {
    let (subject, body) = message.split_once('\n').unwrap_or((message, ""));
    let short = tag.strip_prefix('v').unwrap_or(tag);
    format!(
        "{}\n\n{} stable review patch.\nIf anyone has any objections, please let me know.\n\n-----------\n\n\n{}",
        subject,
        short,
        body.trim_start_matches('\n')
    )
}

pub fn fill_cover_letter(letter: &str, subject: &str, blurb: &str) -> String {
    letter
        .replacen(SUBJECT_MARKER, subject, 1)
        .replacen(BLURB_MARKER, blurb, 1)
}

pub fn send_email_command(
    to: &[String],
    mails: &Path,
    suppress_cc: bool,
    dry_run: bool,
) -> ToolCommand {
    let mut cmd = ToolCommand::git(["send-email"]);
    if dry_run {
        cmd = cmd.arg("--dry-run");
    }
    cmd = cmd.arg("--confirm=never");
    if suppress_cc {
        cmd = cmd.arg("--suppress-cc=all");
    }
    cmd.args(to.iter().map(|t| format!("--to={}", t)))
        .arg(mails.to_string_lossy())
}

/// Review series of a release candidate in the mails directory, rewritten
/// on a scratch branch
fn create_rc_patches(session: &Session, ctx: &ReleaseContext, filter: &str) -> Result<()> {
    let branch = session.repo.local_branch_name()?;
    let range = format!("{}..", ctx.old.tag);

    session.run(&ToolCommand::git(["checkout", "-b", TMP_BRANCH]))?;

    let result = session
        .run(
            &ToolCommand::git(["filter-branch", "-f", "--msg-filter", filter, range.as_str()])
                .env(REVIEW_TAG_ENV, ctx.new.tag.to_string()),
        )
        .and_then(|_| {
            session.run(&ToolCommand::git([
                "format-patch".to_string(),
                range.clone(),
                "-o".to_string(),
                ctx.new.dir_mails.to_string_lossy().into_owned(),
                "--subject-prefix".to_string(),
                "PATCH RT".to_string(),
                "--cover-letter".to_string(),
            ]))
        });

    session.run(&ToolCommand::git(["checkout", branch.as_str()]))?;
    session.run(&ToolCommand::git(["branch", "-D", TMP_BRANCH]))?;
    result.map(|_| ())
}

fn write_rc_cover_letter(session: &Session, ctx: &ReleaseContext) -> Result<()> {
    let path = ctx.new.dir_mails.join(COVER_LETTER);
    let letter = fs::read_to_string(&path)?;

    let mut r = replacements(session, ctx)?;
    r.insert(
        "release_date",
        (Local::now().date_naive() + Duration::weeks(1)).to_string(),
    );
    let text = template::load(session.config.rc_text.as_deref(), template::RC_TEMPLATE)?;
    let blurb = template::render(&text, &r)?;

    let subject = format!("Linux {}", ctx.new.tag);
    fs::write(&path, fill_cover_letter(&letter, &subject, &blurb))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn send_rc_patches(session: &Session, ctx: &ReleaseContext, suppress_cc: bool) -> Result<()> {
    let to = session.config.mail_to()?;

    ui::display_status("Dry run");
    let dry_run = send_email_command(to, &ctx.new.dir_mails, suppress_cc, true);
    ui::display_command(&dry_run);
    println!("{}", session.run(&dry_run)?);

    if session.confirm("OK to send patches?")? {
        session.run(&send_email_command(to, &ctx.new.dir_mails, suppress_cc, false))?;
        info!("Sent review series for {}", ctx.new.tag);
    }
    Ok(())
}

/// Announcement text of a final release followed by shortlog, diffstat
/// and the full diff
pub fn announcement(session: &Session, ctx: &ReleaseContext) -> Result<String> {
    let range = format!("{}..{}", ctx.old.tag, ctx.new.tag);

    let mut r = replacements(session, ctx)?;
    r.insert("date", Utc::now().to_rfc2822());
    let upstream = session.repo.upstream_branch_name()?;
    r.insert("branch_name", short_branch_name(&upstream).to_string());
    r.insert("branch_head", session.repo.head_commit()?);

    let text = template::load(session.config.announce.as_deref(), template::ANNOUNCE_TEMPLATE)?;
    let mut out = template::render(&text, &r)?;
    if !out.ends_with('\n') {
        out.push('\n');
    }

    let shortlog = session.run(&ToolCommand::git(["--no-pager", "shortlog", range.as_str()]))?;
    let stat = session.run(&ToolCommand::git(["--no-pager", "diff", "--stat", range.as_str()]))?;
    let diff = session.run(&ToolCommand::git(["--no-pager", "diff", range.as_str()]))?;

    out.push_str(&format!("{}\n---\n{}\n---\n{}\n", shortlog, stat, diff));
    Ok(out)
}

pub fn run(session: &Session, ctx: &ReleaseContext, options: &AnnounceOptions) -> Result<()> {
    if ctx.is_release_candidate() {
        fs::create_dir_all(&ctx.new.dir_mails)?;
        create_rc_patches(session, ctx, &options.review_filter)?;
        write_rc_cover_letter(session, ctx)?;
        send_rc_patches(session, ctx, options.suppress_cc)
    } else {
        print!("{}", announcement(session, ctx)?);
        Ok(())
    }
}
