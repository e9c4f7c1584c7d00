//! `srt sign`: detached signatures for the release artifacts
//!
//! kernel.org verifies signatures against the uncompressed content, so
//! each `.xz` artifact is decompressed into `gpg2` and the signature is
//! named after the uncompressed file: `patch-4.4.115-rt38.patch.xz` is
//! signed as `patch-4.4.115-rt38.patch.sign`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ReleaseConfig;
use crate::domain::ReleaseContext;
use crate::error::{Result, SrtError};
use crate::preflight;
use crate::process::{ToolCommand, ToolRunner};

fn strip_xz(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == "xz" => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

/// `<dir>/<name>.xz` -> `<dir>/<name>.sign`
pub fn signature_path(artifact: &Path) -> PathBuf {
    let mut path = strip_xz(artifact).into_os_string();
    path.push(".sign");
    PathBuf::from(path)
}

pub fn gpg_command(gnupghome: &str, key: &str, artifact: &Path) -> ToolCommand {
    let filename = strip_xz(artifact)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    ToolCommand::new("gpg2").args([
        "--homedir".to_string(),
        gnupghome.to_string(),
        "--local-user".to_string(),
        format!("{}!", key),
        "--quiet".to_string(),
        "--armor".to_string(),
        "--detach-sign".to_string(),
        "-o".to_string(),
        signature_path(artifact).to_string_lossy().into_owned(),
        "--set-filename".to_string(),
        filename,
        "-".to_string(),
    ])
}

pub fn sign_file(runner: &dyn ToolRunner, gnupghome: &str, key: &str, artifact: &Path) -> Result<()> {
    let decompress = ToolCommand::new("xz").args(["-dc", "--"]).arg(artifact.to_string_lossy());
    runner.pipe(&decompress, &gpg_command(gnupghome, key, artifact))?;
    debug!("Signed {}", artifact.display());
    Ok(())
}

/// Fingerprint from `gpg2 --with-colons` output: field 10 of the first
/// `fpr` record
pub fn parse_fingerprint(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.starts_with("fpr:"))
        .and_then(|line| line.split(':').nth(9))
        .filter(|fpr| !fpr.is_empty())
        .map(str::to_string)
}

/// Fingerprint of `key` in the configured keyring
pub fn gpg_fingerprint(runner: &dyn ToolRunner, gnupghome: &str, key: &str) -> Result<String> {
    let output = runner.run(&ToolCommand::new("gpg2").args([
        "--homedir",
        gnupghome,
        "--with-colons",
        "--fingerprint",
        key,
    ]))?;
    parse_fingerprint(&output)
        .ok_or_else(|| SrtError::config(format!("no fingerprint for key {}", key)))
}

pub fn run(runner: &dyn ToolRunner, config: &ReleaseConfig, ctx: &ReleaseContext) -> Result<()> {
    preflight::into_result(preflight::check_artifacts(ctx))?;

    let key = config.gpg_key_id()?;
    let gnupghome = config.gnupghome();
    let fingerprint = gpg_fingerprint(runner, &gnupghome, key)?;
    info!("Signing with key {}", fingerprint);

    for artifact in ctx.artifact_files() {
        sign_file(runner, &gnupghome, key, &artifact)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Invocation, RecordingRunner};
    use crate::release::testing;
    use std::fs;

    const COLONS: &str = "\
pub:u:4096:1:1E0A306C5D0A306C:1530000000:::u:::scESC::::::23::0:
fpr:::::::::0F3E2A1D6C1E0A306C5D0A306C5D0A306C5D0A306C:
uid:u::::1530000000::ABCDEF::Mighty Eagle <me@incredible.com>::::::::::0:";

    #[test]
    fn test_signature_path() {
        assert_eq!(
            signature_path(Path::new("/w/patch-4.4.115-rt38.patch.xz")),
            PathBuf::from("/w/patch-4.4.115-rt38.patch.sign")
        );
        assert_eq!(
            signature_path(Path::new("/w/notes.txt")),
            PathBuf::from("/w/notes.txt.sign")
        );
    }

    #[test]
    fn test_gpg_command() {
        let cmd = gpg_command("/g", "5D0A306C", Path::new("/w/patches-4.4.115-rt38.tar.xz"));
        assert_eq!(
            cmd.to_string(),
            "gpg2 --homedir /g --local-user 5D0A306C! --quiet --armor --detach-sign \
             -o /w/patches-4.4.115-rt38.tar.sign --set-filename patches-4.4.115-rt38.tar -"
        );
    }

    #[test]
    fn test_parse_fingerprint() {
        assert_eq!(
            parse_fingerprint(COLONS).as_deref(),
            Some("0F3E2A1D6C1E0A306C5D0A306C5D0A306C5D0A306C")
        );
        assert_eq!(parse_fingerprint("pub:u:4096"), None);
    }

    #[test]
    fn test_sign_requires_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.116-rt39", dir.path()).unwrap();
        let runner = RecordingRunner::new();

        let err = run(&runner, &testing::config(), &ctx).unwrap_err();
        assert!(matches!(err, SrtError::MissingArtifact(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_sign_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ReleaseContext::new("v4.4.115-rt38", "v4.4.115-rt39", dir.path()).unwrap();
        fs::create_dir_all(&ctx.new.dir_patches).unwrap();
        for file in ctx.artifact_files() {
            fs::write(file, b"xz").unwrap();
        }
        let runner = RecordingRunner::new().respond("gpg2 --homedir /home/me/.gnupg --with-colons", COLONS);

        run(&runner, &testing::config(), &ctx).unwrap();

        let pipes: Vec<_> = runner
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Invocation::Pipe(..)))
            .collect();
        assert_eq!(pipes.len(), 3);
    }
}
