//! External tool execution
//!
//! Every stage of a release drives command-line tools (`git`, `xz`, `tar`,
//! `gpg2`, `kup`, `make`). They are described as [`ToolCommand`] values and
//! executed through the [`ToolRunner`] trait, so stages can be exercised
//! against [`RecordingRunner`] without touching the system.

pub mod recording;
pub mod system;

pub use recording::{Invocation, RecordingRunner};
pub use system::SystemRunner;

use std::fmt;
use std::path::Path;

use crate::error::Result;

/// A program invocation with its arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Added on top of the inherited environment
    pub env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ToolCommand {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Shorthand for `git <args>`
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ToolCommand::new("git").args(args)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program followed by its arguments, one element each
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Executes tool commands
pub trait ToolRunner {
    /// Run a command to completion and return its trimmed stdout
    fn run(&self, command: &ToolCommand) -> Result<String>;

    /// Run `producer | consumer` and return the consumer's trimmed stdout
    fn pipe(&self, producer: &ToolCommand, consumer: &ToolCommand) -> Result<String>;

    /// Run `producer | consumer > output`
    fn pipe_to_file(
        &self,
        producer: &ToolCommand,
        consumer: &ToolCommand,
        output: &Path,
    ) -> Result<()>;
}
