//! `srt upload`: publish the artifacts with `kup`
//!
//! Artifacts are archived in `<prj_dir>/older/`, linked into `<prj_dir>`
//! and the links of the previous release are removed, all in a single
//! `kup` session.

use std::path::Path;

use tracing::info;

use super::sign::signature_path;
use super::Session;
use crate::domain::ReleaseContext;
use crate::error::{Result, SrtError};
use crate::preflight;
use crate::process::ToolCommand;
use crate::ui;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn kup_command(prj_dir: &str, ctx: &ReleaseContext) -> ToolCommand {
    let older = format!("{}/older", prj_dir);
    let mut kup = ToolCommand::new("kup");

    for file in ctx.artifact_files() {
        kup = kup.args([
            "put".to_string(),
            file.to_string_lossy().into_owned(),
            signature_path(&file).to_string_lossy().into_owned(),
            format!("{}/", older),
            "--".to_string(),
        ]);
    }

    for file in ctx.artifact_files() {
        kup = kup.args([
            "ln".to_string(),
            format!("{}/{}", older, file_name(&file)),
            "../".to_string(),
            "--".to_string(),
        ]);
    }

    for file in ctx.predecessor_artifact_files() {
        kup = kup.args([
            "rm".to_string(),
            format!("{}/{}", prj_dir, file_name(&file)),
            "--".to_string(),
        ]);
    }

    kup.args(["ls", prj_dir])
}

pub fn run(session: &Session, ctx: &ReleaseContext) -> Result<()> {
    preflight::into_result(preflight::check_artifacts(ctx))?;

    let kup = kup_command(session.config.prj_dir()?, ctx);
    ui::display_command(&kup);

    if !session.confirm("OK to upload?")? {
        return Ok(());
    }

    match session.run(&kup) {
        Ok(listing) => {
            println!("{}", listing);
            info!("Uploaded {}", ctx.new.tag);
            Ok(())
        }
        Err(SrtError::Tool { code, stderr, .. }) => {
            ui::display_error(&format!("kup failed with error code {}", code));
            Err(SrtError::tool("kup", code, stderr))
        }
        Err(e) => Err(e),
    }
}
