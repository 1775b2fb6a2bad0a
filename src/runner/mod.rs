//! External process execution
//!
//! Every external tool is driven the same way: a literal command line, run
//! through the platform shell inside a working directory, with its stdout and
//! stderr forwarded to ours while it runs. A spawn failure or a non-zero exit
//! becomes a [`ProcessError`] naming the directory and the command line.

pub mod mock;

use crate::error::ProcessError;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub use mock::ScriptedRunner;

/// A command line bound to the directory it must run in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Tool name used in logs and error messages
    pub tool: String,
    /// Literal command line handed to the shell
    pub line: String,
    /// Directory the command runs in
    pub working_dir: PathBuf,
}

impl ToolCommand {
    pub fn new(
        tool: impl Into<String>,
        line: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tool: tool.into(),
            line: line.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (in {})", self.tool, self.line, self.working_dir.display())
    }
}

/// Runs external commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command and waits for it; non-zero exit is an error
    async fn run(&self, command: &ToolCommand) -> Result<(), ProcessError>;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows), forwarding output
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(line: &str) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(line);
            command
        } else {
            let mut command = Command::new("sh");
            command.arg("-c").arg(line);
            command
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        info!(tool = %command.tool, "Running: {}", command.line);
        debug!(working_dir = %command.working_dir.display(), "Command working directory");

        let mut child = Self::shell_command(&command.line)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                tool: command.tool.clone(),
                command: command.line.clone(),
                working_dir: command.working_dir.clone(),
                source,
            })?;

        // Both pipes are drained concurrently so a full buffer on one side
        // cannot stall the child.
        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| tokio::spawn(forward(stdout, tokio::io::stdout())));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(forward(stderr, tokio::io::stderr())));

        let status = child.wait().await.map_err(|source| ProcessError::Wait {
            tool: command.tool.clone(),
            command: command.line.clone(),
            working_dir: command.working_dir.clone(),
            source,
        })?;

        for task in [stdout_task, stderr_task].into_iter().flatten() {
            if let Err(e) = task.await {
                warn!(tool = %command.tool, error = %e, "Output forwarding task failed");
            }
        }

        if status.success() {
            debug!(tool = %command.tool, "Command finished successfully");
            Ok(())
        } else {
            Err(ProcessError::Exit {
                tool: command.tool.clone(),
                command: command.line.clone(),
                working_dir: command.working_dir.clone(),
                code: status.code(),
            })
        }
    }
}

async fn forward<R, W>(mut reader: R, mut writer: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(e) = tokio::io::copy(&mut reader, &mut writer).await {
        debug!(error = %e, "Stream forwarding stopped");
    }
}

/// Quotes a path for use inside a shell command line
pub fn quote_path(path: &Path) -> String {
    let raw = path.display().to_string();
    if cfg!(windows) {
        format!("\"{}\"", raw)
    } else {
        let mut quoted = String::with_capacity(raw.len() + 2);
        quoted.push('"');
        for c in raw.chars() {
            if matches!(c, '"' | '\\' | '$' | '`') {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    }
}
