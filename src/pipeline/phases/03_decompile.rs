use crate::error::IoError;
use crate::pipeline::context::DecompileContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use tracing::info;

/// Runs the requested decompiler over the converted archive
pub struct DecompilePhase;

#[async_trait]
impl WorkflowPhase for DecompilePhase {
    fn name(&self) -> &'static str {
        "decompile"
    }

    async fn execute(&self, context: &mut DecompileContext) -> Result<()> {
        let decompiler = context.request.decompiler;
        let spec = decompiler.spec();
        let inputs = context.decompiler_inputs();

        fs::create_dir_all(&inputs.sources)
            .map_err(|e| IoError::new("decompile.create_sources", &inputs.sources, e))?;

        let line = (spec.build_command)(&inputs)?;
        let working_dir = spec.launch_dir(
            &inputs.tool_dir,
            context.request.external_tool_path.as_deref(),
        )?;

        info!(decompiler = %decompiler, "Decompiling");
        context.run_tool(decompiler.name(), line, working_dir).await
    }
}
