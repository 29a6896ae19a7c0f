//! External process execution.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use std::{fmt::Display, path::PathBuf};
use tokio::process::Command;

use crate::error::{ReleaseError, Result};

/// A program invocation. Quiet commands are expected to fail sometimes
/// (existence checks) and only log failures at debug level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub quiet: bool,
}

impl ProcessCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            quiet: false,
        }
    }

    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git", args)
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl Display for ProcessCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args.iter() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs system commands, returning trimmed stdout. A non-zero exit becomes
/// [`ReleaseError::CommandFailed`] carrying the command line and stderr.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<String>;
}

/// Runs commands as child processes of the current one.
pub struct TokioCommandRunner {
    working_dir: PathBuf,
}

impl TokioCommandRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: ProcessCommand) -> Result<String> {
        let line = command.to_string();
        debug!("running command: {line}");

        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&self.working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReleaseError::command_failed(&line, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            if command.quiet {
                debug!("command failed: {line}\n{stderr}");
            } else {
                error!("command failed: {line}\n{stderr}");
            }

            return Err(ReleaseError::command_failed(line, stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
