//! External command execution
//!
//! Helm is driven as a child process. [`CommandRunner`] is the seam that lets
//! release operations run against a fake in tests.

use async_trait::async_trait;
use console::style;
use std::process::Stdio;
use tracing::debug;

use crate::command::Invocation;
use crate::error::{KubeError, Result};

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` and capture its output
    ///
    /// A process that cannot be started or that exits non-zero is an error.
    /// With `verbose`, the command line and its output are echoed to the
    /// operator.
    async fn run(&self, invocation: &Invocation, verbose: bool) -> Result<CommandOutput>;
}

/// Runs commands on the local host
#[derive(Debug, Clone, Copy, Default)]
pub struct HostRunner;

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, invocation: &Invocation, verbose: bool) -> Result<CommandOutput> {
        let command_line = invocation.to_string();
        if verbose {
            eprintln!("{} {}", style("$").dim(), style(&command_line).bold());
        }
        debug!(command = %command_line, "Running external command");

        let output = tokio::process::Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| KubeError::CommandSpawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if verbose {
            print!("{}", stdout);
            eprint!("{}", stderr);
        }

        if !output.status.success() {
            return Err(KubeError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        debug!(bytes = stdout.len(), "External command succeeded");
        Ok(CommandOutput { stdout, stderr })
    }
}
