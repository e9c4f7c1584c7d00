// tests/stages_test.rs
//
// Release stages against a recording runner and an in-memory repository.
use std::fs;
use std::path::Path;

use srt::config::ReleaseConfig;
use srt::domain::ReleaseContext;
use srt::git::MockRepository;
use srt::preflight;
use srt::process::RecordingRunner;
use srt::release::{create, push, sign, upload, Session};
use srt::SrtError;

fn config() -> ReleaseConfig {
    ReleaseConfig {
        gpg_key_id: Some("5D0A306C".to_string()),
        gnupghome: Some("/gnupg".to_string()),
        prj_git_tree: Some("git@gitolite.kernel.org:linux-stable-rt".to_string()),
        prj_dir: Some("/pub/linux/kernel/projects/rt/4.4".to_string()),
        section: "linux-stable-rt/origin/v4.4-rt".to_string(),
        ..ReleaseConfig::default()
    }
}

fn session<'a>(
    repo: &'a MockRepository,
    runner: &'a RecordingRunner,
    config: &'a ReleaseConfig,
    root: &Path,
) -> Session<'a> {
    Session {
        repo,
        runner,
        config,
        workdir: root.to_path_buf(),
        assume: Some(true),
    }
}

fn release_repo() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.set_upstream("origin/v4.4-rt");
    for tag in ["v4.4.115-rt38", "v4.4.116-rt39", "v4.4.116", "v4.4.116-rt39-rebase"] {
        repo.add_tag(tag);
    }
    repo
}

#[test]
fn test_preflight_passes_with_all_tags() {
    let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.116-rt39", "/w").unwrap();
    assert!(preflight::check_tags(&release_repo(), &ctx).unwrap().is_empty());
}

#[test]
fn test_release_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.116-rt39", dir.path()).unwrap();
    let repo = release_repo();
    let config = config();

    let runner = RecordingRunner::new();
    create::run(&runner, &ctx).unwrap();
    assert!(ctx.new.dir_series.join(create::SERIES_FILE).is_file());
    assert_eq!(runner.command_lines().len(), 3);

    // The recording runner does not write the artifacts, sign must notice
    let runner = RecordingRunner::new();
    assert!(matches!(
        sign::run(&runner, &config, &ctx),
        Err(SrtError::MissingArtifact(_))
    ));

    for file in ctx.artifact_files() {
        fs::write(file, b"xz").unwrap();
    }
    let runner = RecordingRunner::new().respond(
        "gpg2 --homedir /gnupg --with-colons",
        "fpr:::::::::0F3E2A1D6C1E0A306C5D0A306C5D0A306C5D0A306C:",
    );
    sign::run(&runner, &config, &ctx).unwrap();
    assert!(runner
        .command_lines()
        .iter()
        .any(|l| l.ends_with("--set-filename patches-4.4.116-rt39.tar -")));

    let runner = RecordingRunner::new();
    upload::run(&session(&repo, &runner, &config, dir.path()), &ctx).unwrap();
    let lines = runner.command_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("kup put "));
    assert!(lines[0].ends_with("ls /pub/linux/kernel/projects/rt/4.4"));

    let runner = RecordingRunner::new();
    push::run(&session(&repo, &runner, &config, dir.path()), &ctx).unwrap();
    let lines = runner.command_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("git push -n "));
    assert!(lines[1].contains("+v4.4.116-rt39-rebase^{}:v4.4-rt-rebase"));
}

#[test]
fn test_push_requires_tree() {
    let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.116-rt39", "/w").unwrap();
    let repo = release_repo();
    let config = ReleaseConfig::default();
    let runner = RecordingRunner::new();

    let err = push::run(&session(&repo, &runner, &config, Path::new("/w")), &ctx).unwrap_err();
    assert!(err.to_string().contains("prj_git_tree"));
    assert!(runner.calls().is_empty());
}
