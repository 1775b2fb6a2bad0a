//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler, ToolState};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted {
                package,
                decompiler,
            } => {
                info!(
                    package = %package.display(),
                    decompiler = %decompiler,
                    "Starting decompilation"
                );
            }
            ProgressEvent::PhaseStarted { phase } => {
                info!(phase = %phase, "Starting phase");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                info!(
                    phase = %phase,
                    duration_ms = duration.as_millis(),
                    "Phase complete"
                );
            }
            ProgressEvent::ToolStateChanged { tool, state } => match state {
                ToolState::Failed => {
                    warn!(tool = %tool, state = %state, "Tool provisioning failed")
                }
                ToolState::Ready => info!(tool = %tool, "Tool ready"),
                _ => debug!(tool = %tool, state = %state, "Tool state changed"),
            },
            ProgressEvent::VerificationComplete { missing } => {
                if missing.is_empty() {
                    info!("Toolset verified");
                } else {
                    warn!(missing = ?missing, "Toolset verification found missing tools");
                }
            }
            ProgressEvent::Completed { output, total_time } => {
                info!(
                    output = %output.display(),
                    total_time_ms = total_time.as_millis(),
                    "Decompilation complete"
                );
            }
            ProgressEvent::Failed { error: message } => {
                error!(error = %message, "Decompilation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::RunStarted {
                package: PathBuf::from("/tmp/app.apk"),
                decompiler: "jadx".to_string(),
            },
            ProgressEvent::PhaseStarted {
                phase: "unpack".to_string(),
            },
            ProgressEvent::PhaseComplete {
                phase: "unpack".to_string(),
                duration: Duration::from_millis(50),
            },
            ProgressEvent::ToolStateChanged {
                tool: "cfr".to_string(),
                state: ToolState::Fetching,
            },
            ProgressEvent::ToolStateChanged {
                tool: "cfr".to_string(),
                state: ToolState::Failed,
            },
            ProgressEvent::VerificationComplete { missing: vec![] },
            ProgressEvent::VerificationComplete {
                missing: vec!["cfr".to_string()],
            },
            ProgressEvent::Completed {
                output: PathBuf::from("/tmp/out"),
                total_time: Duration::from_secs(5),
            },
            ProgressEvent::Failed {
                error: "Test error".to_string(),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
