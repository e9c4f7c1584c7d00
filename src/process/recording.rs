use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{ToolCommand, ToolRunner};
use crate::error::{Result, SrtError};

/// One call observed by [`RecordingRunner`]
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(ToolCommand),
    Pipe(ToolCommand, ToolCommand),
    PipeToFile(ToolCommand, ToolCommand, PathBuf),
}

/// Test runner that records commands instead of executing them.
///
/// Responses are matched on the command line prefix (`"git rev-parse"`),
/// longest prefix first. Unmatched commands return an empty string.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    responses: HashMap<String, std::result::Result<String, i32>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Reply with `stdout` to commands starting with `prefix`
    pub fn respond(mut self, prefix: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.responses.insert(prefix.into(), Ok(stdout.into()));
        self
    }

    /// Fail commands starting with `prefix` with exit `code`
    pub fn fail(mut self, prefix: impl Into<String>, code: i32) -> Self {
        self.responses.insert(prefix.into(), Err(code));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every command line seen, pipes rendered as `a | b`
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| match call {
                Invocation::Run(cmd) => cmd.to_string(),
                Invocation::Pipe(a, b) => format!("{} | {}", a, b),
                Invocation::PipeToFile(a, b, path) => {
                    format!("{} | {} > {}", a, b, path.display())
                }
            })
            .collect()
    }

    fn record(&self, call: Invocation) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn reply(&self, command: &ToolCommand) -> Result<String> {
        let line = command.to_string();
        let best = self
            .responses
            .iter()
            .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len());

        match best {
            Some((_, Ok(stdout))) => Ok(stdout.clone()),
            Some((_, Err(code))) => Err(SrtError::tool(&command.program, *code, "")),
            None => Ok(String::new()),
        }
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> Result<String> {
        self.record(Invocation::Run(command.clone()));
        self.reply(command)
    }

    fn pipe(&self, producer: &ToolCommand, consumer: &ToolCommand) -> Result<String> {
        self.record(Invocation::Pipe(producer.clone(), consumer.clone()));
        self.reply(producer)?;
        self.reply(consumer)
    }

    fn pipe_to_file(
        &self,
        producer: &ToolCommand,
        consumer: &ToolCommand,
        output: &Path,
    ) -> Result<()> {
        self.record(Invocation::PipeToFile(
            producer.clone(),
            consumer.clone(),
            output.to_path_buf(),
        ));
        self.reply(producer)?;
        self.reply(consumer)?;
        Ok(())
    }
}
