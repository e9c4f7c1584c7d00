//! `srt push`: publish branch and tags to the project tree

use super::Session;
use crate::domain::ReleaseContext;
use crate::error::Result;
use crate::git::short_branch_name;
use crate::process::ToolCommand;
use crate::ui;

/// Destination followed by refspecs. Release candidates only update the
/// branch and their tag, final releases also force the rebase branch.
pub fn push_refspecs(tree: &str, branch: &str, ctx: &ReleaseContext) -> Vec<String> {
    let new = ctx.new.tag.to_string();
    let mut args = vec![tree.to_string(), format!("{}^{{}}:{}", new, branch)];

    if ctx.is_release_candidate() {
        args.extend(["tag".to_string(), new]);
    } else {
        args.push(format!("+{}-rebase^{{}}:{}-rebase", new, branch));
        args.extend([
            "tag".to_string(),
            new.clone(),
            "tag".to_string(),
            format!("{}-rebase", new),
        ]);
    }
    args
}

pub fn push_command(ctx: &ReleaseContext, dry_run: bool) -> ToolCommand {
    let mut cmd = ToolCommand::git(["push"]);
    if ctx.is_release_candidate() {
        cmd = cmd.arg("-f");
    }
    if dry_run {
        cmd = cmd.arg("-n");
    }
    cmd
}

pub fn run(session: &Session, ctx: &ReleaseContext) -> Result<()> {
    let upstream = session.repo.upstream_branch_name()?;
    let branch = short_branch_name(&upstream);
    let refspecs = push_refspecs(session.config.prj_git_tree()?, branch, ctx);

    ui::display_status("Dry run");
    let dry_run = push_command(ctx, true).args(refspecs.iter().cloned());
    ui::display_command(&dry_run);
    let output = session.run(&dry_run)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    if session.confirm("OK to push?")? {
        session.run(&push_command(ctx, false).args(refspecs))?;
        ui::display_success(&format!("Pushed {}", ctx.new.tag));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::process::RecordingRunner;
    use crate::release::testing;

    const TREE: &str = "git@gitolite.kernel.org:linux-stable-rt";

    #[test]
    fn test_refspecs_final_release() {
        let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.116-rt39", "/w").unwrap();
        assert_eq!(
            push_refspecs(TREE, "v4.4-rt", &ctx),
            vec![
                TREE,
                "v4.4.116-rt39^{}:v4.4-rt",
                "+v4.4.116-rt39-rebase^{}:v4.4-rt-rebase",
                "tag",
                "v4.4.116-rt39",
                "tag",
                "v4.4.116-rt39-rebase",
            ]
        );
        assert_eq!(push_command(&ctx, true).to_string(), "git push -n");
    }

    #[test]
    fn test_refspecs_release_candidate() {
        let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.115-rt39-rc1", "/w").unwrap();
        assert_eq!(
            push_refspecs(TREE, "v4.4-rt-next", &ctx),
            vec![TREE, "v4.4.115-rt39-rc1^{}:v4.4-rt-next", "tag", "v4.4.115-rt39-rc1"]
        );
        assert_eq!(push_command(&ctx, false).to_string(), "git push -f");
    }

    #[test]
    fn test_push_dry_run_first() {
        let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.115-rt39-rc1", "/w").unwrap();
        let mut repo = MockRepository::new();
        repo.set_upstream("origin/v4.4-rt-next");
        let runner = RecordingRunner::new();
        let config = testing::config();
        let dir = tempfile::tempdir().unwrap();

        let session = testing::session(&repo, &runner, &config, dir.path(), false);
        run(&session, &ctx).unwrap();
        assert_eq!(
            runner.command_lines(),
            vec![format!(
                "git push -f -n {} v4.4.115-rt39-rc1^{{}}:v4.4-rt-next tag v4.4.115-rt39-rc1",
                TREE
            )]
        );

        let runner = RecordingRunner::new();
        let session = testing::session(&repo, &runner, &config, dir.path(), true);
        run(&session, &ctx).unwrap();
        assert_eq!(runner.command_lines().len(), 2);
        assert!(runner.command_lines()[1].starts_with("git push -f git@"));
    }
}
