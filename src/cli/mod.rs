//! Command line interface
//!
//! The clap command tree lives here, [`orchestration`] wires a parsed
//! command to the release stages.

pub mod orchestration;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "srt", version, about = "srt - stable -rt tool")]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(short, long, global = true, help = "Skip confirmation prompts")]
    pub force: bool,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bump the localversion marker and create the release commit
    Commit {
        #[arg(short = 'r', long = "release-candidate", value_name = "N")]
        release_candidate: Option<u32>,
    },

    /// Sign a tag for the release commit at HEAD
    Tag {
        #[arg(short = 'r', long = "release-candidate", value_name = "N")]
        release_candidate: Option<u32>,
    },

    /// Create patch, series tarball and incremental patch
    Create {
        #[arg(value_name = "OLD_TAG")]
        old_tag: String,
        #[arg(value_name = "NEW_TAG")]
        new_tag: String,
    },

    /// Create detached signatures for the release artifacts
    Sign(TagRange),

    /// Upload the release artifacts with kup
    Upload(TagRange),

    /// Push branch and tags to the project tree
    Push(TagRange),

    /// Mail a release candidate for review or print the release announcement
    Announce {
        #[arg(value_name = "OLD_TAG")]
        old_tag: String,
        #[arg(value_name = "NEW_TAG")]
        new_tag: String,
        #[arg(short, long, help = "Don't auto-cc anyone (for testing)")]
        suppress_cc: bool,
    },

    /// Message filter used by `announce` to mark review patches
    #[command(hide = true)]
    ReviewFilter,
}

/// Tags that are derived from git history when omitted
#[derive(Debug, clap::Args)]
pub struct TagRange {
    #[arg(value_name = "OLD_TAG", requires = "new_tag")]
    pub old_tag: Option<String>,
    #[arg(value_name = "NEW_TAG")]
    pub new_tag: Option<String>,
}
