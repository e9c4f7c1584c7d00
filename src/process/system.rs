use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use tracing::debug;

use super::{ToolCommand, ToolRunner};
use crate::error::{Result, SrtError};

/// Runs commands on the host, optionally inside a working directory
#[derive(Debug, Default, Clone)]
pub struct SystemRunner {
    workdir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner::default()
    }

    pub fn in_dir(workdir: impl Into<PathBuf>) -> Self {
        SystemRunner {
            workdir: Some(workdir.into()),
        }
    }

    fn command(&self, tool: &ToolCommand) -> Command {
        let mut cmd = Command::new(&tool.program);
        cmd.args(&tool.args);
        for (key, value) in &tool.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn spawn(&self, tool: &ToolCommand, cmd: &mut Command) -> Result<Child> {
        cmd.spawn()
            .map_err(|e| SrtError::tool(&tool.program, -1, format!("cannot execute: {}", e)))
    }
}

/// Stops a producer whose consumer never started
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn check(tool: &ToolCommand, output: Output) -> Result<String> {
    finish(tool, output, &mut io::stderr().lock())
}

/// Stdout of a finished tool. Its stderr carries reports such as the
/// `git push -n` ref list, so on success it is passed on to `diagnostics`.
fn finish(tool: &ToolCommand, output: Output, diagnostics: &mut dyn Write) -> Result<String> {
    if !output.status.success() {
        return Err(SrtError::tool(
            &tool.program,
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim(),
        ));
    }
    if !output.stderr.is_empty() {
        diagnostics.write_all(&output.stderr)?;
        diagnostics.flush()?;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("     {}", stdout);
    Ok(stdout)
}

impl ToolRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<String> {
        debug!("run: {}", command);
        let output = self
            .command(command)
            .stdin(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| SrtError::tool(&command.program, -1, format!("cannot execute: {}", e)))?;
        check(command, output)
    }

    fn pipe(&self, producer: &ToolCommand, consumer: &ToolCommand) -> Result<String> {
        debug!("run: {} | {}", producer, consumer);
        let mut first = self.spawn(producer, self.command(producer).stdout(Stdio::piped()))?;
        let stdout = first
            .stdout
            .take()
            .ok_or_else(|| SrtError::tool(&producer.program, -1, "stdout not captured"))?;

        let second = match self.spawn(
            consumer,
            self.command(consumer)
                .stdin(Stdio::from(stdout))
                .stdout(Stdio::piped())
                .stderr(Stdio::piped()),
        ) {
            Ok(child) => child,
            Err(e) => {
                reap(&mut first);
                return Err(e);
            }
        };
        let output = second.wait_with_output()?;
        let status = first.wait()?;
        if !status.success() {
            return Err(SrtError::tool(&producer.program, status.code().unwrap_or(-1), ""));
        }
        check(consumer, output)
    }

    fn pipe_to_file(
        &self,
        producer: &ToolCommand,
        consumer: &ToolCommand,
        output: &Path,
    ) -> Result<()> {
        debug!("run: {} | {} > {}", producer, consumer, output.display());
        let file = File::create(output)?;
        let mut first = self.spawn(producer, self.command(producer).stdout(Stdio::piped()))?;
        let stdout = first
            .stdout
            .take()
            .ok_or_else(|| SrtError::tool(&producer.program, -1, "stdout not captured"))?;

        let mut second = match self.spawn(
            consumer,
            self.command(consumer)
                .stdin(Stdio::from(stdout))
                .stdout(Stdio::from(file)),
        ) {
            Ok(child) => child,
            Err(e) => {
                reap(&mut first);
                return Err(e);
            }
        };
        let consumer_status = second.wait()?;
        let producer_status = first.wait()?;

        if !producer_status.success() {
            return Err(SrtError::tool(
                &producer.program,
                producer_status.code().unwrap_or(-1),
                "",
            ));
        }
        if !consumer_status.success() {
            return Err(SrtError::tool(
                &consumer.program,
                consumer_status.code().unwrap_or(-1),
                "",
            ));
        }
        Ok(())
    }
}
