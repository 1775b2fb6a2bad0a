//! Progress handler trait and events

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Provisioning state of a single tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    Fetching,
    Building,
    Extracting,
    Ready,
    Failed,
}

impl fmt::Display for ToolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolState::Fetching => "fetching",
            ToolState::Building => "building",
            ToolState::Extracting => "extracting",
            ToolState::Ready => "ready",
            ToolState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Events emitted while decompiling a package or provisioning the toolset
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Decompilation run started
    RunStarted {
        package: PathBuf,
        decompiler: String,
    },

    /// Pipeline phase started
    PhaseStarted { phase: String },

    /// Pipeline phase finished
    PhaseComplete { phase: String, duration: Duration },

    /// A tool moved to a new provisioning state
    ToolStateChanged { tool: String, state: ToolState },

    /// Toolset verification finished
    VerificationComplete { missing: Vec<String> },

    /// Run finished successfully
    Completed { output: PathBuf, total_time: Duration },

    /// Run failed
    Failed { error: String },
}

/// Receives progress events from the pipeline and the provisioner
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
