//! Error taxonomy shared by the runner, workspace, toolset and pipeline
//!
//! Leaf operations return these typed errors. Pipeline phases and provisioning
//! steps wrap them with `anyhow::Context` naming the tool and step, and the
//! typed error stays reachable through `anyhow::Error::downcast_ref`.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem operation failure
#[derive(Debug, Error)]
#[error("{operation} failed for {}: {source}", .path.display())]
pub struct IoError {
    /// Operation that triggered the failure (e.g. `copy_tree.copy_file`)
    pub operation: &'static str,
    /// Path involved in the failure
    pub path: PathBuf,
    /// Underlying IO error
    #[source]
    pub source: io::Error,
}

impl IoError {
    pub fn new(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Builds an error for a condition that has no underlying OS error
    pub fn other(
        operation: &'static str,
        path: impl AsRef<Path>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, path, io::Error::new(io::ErrorKind::Other, message.into()))
    }
}

/// Malformed or unreadable archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{operation} failed for archive {}: {source}", .path.display())]
    Zip {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {} contains an entry escaping the destination: {entry}", .path.display())]
    UnsafeEntry { path: PathBuf, entry: String },
}

/// Errors produced by workspace file operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// External process spawn failure or non-zero exit
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(
        "{tool}: could not start `{command}` in {}: {source}",
        .working_dir.display()
    )]
    Spawn {
        tool: String,
        command: String,
        working_dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "{tool}: `{command}` in {} exited with {}",
        .working_dir.display(),
        .code.map(|c| format!("status {}", c)).unwrap_or_else(|| "a signal".to_string())
    )]
    Exit {
        tool: String,
        command: String,
        working_dir: PathBuf,
        code: Option<i32>,
    },

    #[error("{tool}: failed waiting for `{command}` in {}: {source}", .working_dir.display())]
    Wait {
        tool: String,
        command: String,
        working_dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    /// Literal command line of the failed invocation
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::Exit { command, .. }
            | Self::Wait { command, .. } => command,
        }
    }

    /// Working directory of the failed invocation
    pub fn working_dir(&self) -> &Path {
        match self {
            Self::Spawn { working_dir, .. }
            | Self::Exit { working_dir, .. }
            | Self::Wait { working_dir, .. } => working_dir,
        }
    }
}

/// One or more toolset directories are missing after provisioning
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", render_missing(.missing))]
pub struct VerificationError {
    /// Names of every tool whose directory is missing or empty
    pub missing: Vec<String>,
}

fn render_missing(missing: &[String]) -> String {
    let mut message = String::from("The following tools failed to install correctly:\n");
    for tool in missing {
        message.push_str("    ");
        message.push_str(&tool.to_uppercase());
        message.push('\n');
    }
    message.push_str(
        "See the tool output above for details and verify the build dependencies are installed before retrying.",
    );
    message
}

/// A pipeline stage could not find an artifact it cannot do without
#[derive(Debug, Error)]
#[error("Mandatory artifact missing: {artifact} ({})", .path.display())]
pub struct MissingArtifactError {
    pub artifact: &'static str,
    pub path: PathBuf,
}

impl MissingArtifactError {
    /// Fails unless `path` exists
    pub fn require(artifact: &'static str, path: &Path) -> Result<(), Self> {
        if path.exists() {
            Ok(())
        } else {
            Err(Self {
                artifact,
                path: path.to_path_buf(),
            })
        }
    }
}

/// Invalid decompilation request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Package does not exist: {}", .0.display())]
    PackageNotFound(PathBuf),

    #[error("Package is not a regular file: {}", .0.display())]
    PackageNotAFile(PathBuf),

    #[error("{decompiler} requires the path to its installation directory")]
    MissingExternalTool { decompiler: &'static str },

    #[error("External tool directory does not exist or is not a directory: {}", .0.display())]
    ExternalToolNotADirectory(PathBuf),

    #[error("Output path exists and is not a directory: {}", .0.display())]
    OutputNotADirectory(PathBuf),

    #[error("Could not create output directory {}: {source}", .path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not resolve {} to an absolute path: {source}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
