use super::context::DecompileContext;
use super::phase_trait::WorkflowPhase;
use super::phases::{
    assemble::AssemblePhase, convert::ConvertPhase, decompile::DecompilePhase,
    normalize::NormalizePhase, unpack::UnpackPhase,
};
use crate::progress::{ProgressEvent, ProgressHandler};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct PipelineOrchestrator {
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineOrchestrator {
    pub fn new(progress_handler: Option<Arc<dyn ProgressHandler>>) -> Self {
        Self { progress_handler }
    }

    fn phases() -> Vec<Box<dyn WorkflowPhase>> {
        vec![
            Box::new(UnpackPhase),
            Box::new(ConvertPhase),
            Box::new(DecompilePhase),
            Box::new(NormalizePhase),
            Box::new(AssemblePhase),
        ]
    }

    /// Runs every phase in order and returns where the project was written
    pub async fn execute(&self, context: &mut DecompileContext) -> Result<PathBuf> {
        let start = Instant::now();
        info!(
            package = %context.request.package.display(),
            decompiler = %context.request.decompiler,
            "Starting pipeline"
        );
        self.emit(&ProgressEvent::RunStarted {
            package: context.request.package.clone(),
            decompiler: context.request.decompiler.to_string(),
        });

        for phase in Self::phases() {
            let phase_name = phase.name();
            self.emit(&ProgressEvent::PhaseStarted {
                phase: phase_name.to_string(),
            });

            let phase_start = Instant::now();
            phase
                .execute(context)
                .await
                .with_context(|| format!("{} phase failed", phase_name))?;

            self.emit(&ProgressEvent::PhaseComplete {
                phase: phase_name.to_string(),
                duration: phase_start.elapsed(),
            });
            debug!(phase = %phase_name, "Phase complete");
        }

        let output = context
            .promoted
            .clone()
            .ok_or_else(|| anyhow!("Pipeline finished without producing a project"))?;
        self.emit(&ProgressEvent::Completed {
            output: output.clone(),
            total_time: start.elapsed(),
        });
        Ok(output)
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(event);
        }
    }
}
