use super::context::DecompileContext;
use super::orchestrator::PipelineOrchestrator;
use super::request::PipelineRequest;
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::runner::CommandRunner;
use crate::session::DecompileSession;
use crate::toolset::{ToolCatalogue, ToolsetLayout};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs decompilation requests as single transactions
///
/// Each call validates the request, opens a [`DecompileSession`], runs the
/// pipeline and then either commits or rolls back the session.
pub struct DecompileService {
    runner: Arc<dyn CommandRunner>,
    catalogue: Arc<ToolCatalogue>,
    toolset: ToolsetLayout,
    work_root: PathBuf,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl DecompileService {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        catalogue: Arc<ToolCatalogue>,
        toolset: ToolsetLayout,
        work_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            catalogue,
            toolset,
            work_root: work_root.into(),
            progress_handler: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    /// Decompiles `request.package` into `request.output`
    ///
    /// Returns the path of the produced project directory or archive.
    pub async fn decompile(&self, mut request: PipelineRequest) -> Result<PathBuf> {
        request.validate().context("Invalid decompilation request")?;

        let session = DecompileSession::begin(&self.work_root, &request)
            .context("Could not create the workspace")?;
        info!(
            run_id = %session.workspace().run_id(),
            workspace = %session.workspace().root().display(),
            "Workspace ready"
        );

        let mut context = DecompileContext::new(
            request,
            session.workspace().layout().clone(),
            self.toolset.clone(),
            self.catalogue.clone(),
            self.runner.clone(),
        );
        let orchestrator = PipelineOrchestrator::new(self.progress_handler.clone());

        match orchestrator.execute(&mut context).await {
            Ok(output) => {
                if let Err(e) = session.commit() {
                    warn!(error = %e, "Could not remove workspace");
                }
                Ok(output)
            }
            Err(e) => {
                error!("Decompilation failed, rolling back");
                if let Some(handler) = &self.progress_handler {
                    handler.on_progress(&ProgressEvent::Failed {
                        error: format!("{:#}", e),
                    });
                }
                if let Err(cleanup) = session.rollback() {
                    warn!(error = %cleanup, "Rollback incomplete");
                }
                Err(e)
            }
        }
    }
}
