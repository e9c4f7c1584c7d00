//! `srt create`: write the release artifacts
//!
//! Release candidates are diffed against the base of the previous release
//! and their series covers only the commits since it. Final releases are
//! diffed against their own base and the series is taken from the rebase
//! tag, which carries the cleaned up history.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::ReleaseContext;
use crate::error::Result;
use crate::process::{ToolCommand, ToolRunner};
use crate::ui;

/// Name of the quilt series file inside the series directory
pub const SERIES_FILE: &str = "series";

/// Revision ranges an artifact set is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranges {
    /// `(from, to)` of the full patch
    pub diff: (String, String),
    /// `(from, to)` of the patch series
    pub series: (String, String),
}

pub fn ranges(ctx: &ReleaseContext) -> Result<Ranges> {
    let new = &ctx.new.tag;
    if new.is_release_candidate() {
        let old = &ctx.old.tag;
        Ok(Ranges {
            diff: (old.base()?, new.to_string()),
            series: (old.to_string(), new.to_string()),
        })
    } else {
        Ok(Ranges {
            diff: (new.base()?, new.to_string()),
            series: (new.base()?, new.rebase_form()),
        })
    }
}

/// `git diff from to | xz -9 > file`
pub fn create_patch_file(runner: &dyn ToolRunner, from: &str, to: &str, file: &Path) -> Result<()> {
    runner.pipe_to_file(
        &ToolCommand::git(["diff", from, to]),
        &ToolCommand::new("xz").arg("-9"),
        file,
    )
}

pub fn create_series(runner: &dyn ToolRunner, from: &str, to: &str, dir: &Path) -> Result<()> {
    let dir_arg = dir.to_string_lossy();
    runner.run(&ToolCommand::git([
        "format-patch".to_string(),
        "-q".to_string(),
        "-o".to_string(),
        dir_arg.into_owned(),
        format!("{}..{}", from, to),
    ]))?;
    write_series_file(dir)
}

/// List every regular file of `dir` except the series file itself, sorted,
/// one per line
pub fn write_series_file(dir: &Path) -> Result<()> {
    let mut patches = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != SERIES_FILE {
            patches.push(name);
        }
    }
    patches.sort();
    debug!("{} patches in series", patches.len());

    let content: String = patches.iter().map(|p| format!("{}\n", p)).collect();
    fs::write(dir.join(SERIES_FILE), content)?;
    Ok(())
}

/// Tarball of the `patches/` directory below `dir`
pub fn create_tar_file(runner: &dyn ToolRunner, dir: &Path, file: &Path) -> Result<()> {
    runner.run(&ToolCommand::new("tar").args([
        "-C".to_string(),
        dir.to_string_lossy().into_owned(),
        "-cJf".to_string(),
        file.to_string_lossy().into_owned(),
        "patches/".to_string(),
    ]))?;
    Ok(())
}

pub fn run(runner: &dyn ToolRunner, ctx: &ReleaseContext) -> Result<()> {
    for dir in [&ctx.new.dir_patches, &ctx.new.dir_series] {
        fs::create_dir_all(dir)?;
    }

    let ranges = ranges(ctx)?;
    debug!(?ranges);

    create_patch_file(runner, &ranges.diff.0, &ranges.diff.1, &ctx.new.patch_file)?;
    create_series(runner, &ranges.series.0, &ranges.series.1, &ctx.new.dir_series)?;
    create_tar_file(runner, &ctx.new.dir_patches, &ctx.new.tar_file)?;

    if let Some(incr) = ctx.incremental_patch_file() {
        create_patch_file(runner, &ctx.old.tag.to_string(), &ctx.new.tag.to_string(), incr)?;
    }

    info!("Created artifacts for {}", ctx.new.tag);
    ui::display_artifacts(&ctx.new.dir_patches, &ctx.artifact_files());
    Ok(())
}
