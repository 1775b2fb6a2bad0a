use crate::error::MissingArtifactError;
use crate::pipeline::context::DecompileContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::runner::quote_path;
use crate::toolset::catalogue::DEX2JAR;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Converts the compiled bytecode into a Java archive with dex2jar
pub struct ConvertPhase;

#[async_trait]
impl WorkflowPhase for ConvertPhase {
    fn name(&self) -> &'static str {
        "convert"
    }

    async fn execute(&self, context: &mut DecompileContext) -> Result<()> {
        let dex = context.workspace.dex();
        MissingArtifactError::require("compiled bytecode (classes.dex)", &dex)?;

        let converted = context.workspace.converted_jar();
        let launcher = if cfg!(windows) {
            "d2j-dex2jar.bat"
        } else {
            "sh ./d2j-dex2jar.sh"
        };
        let line = format!(
            "{} -n -f -o {} {}",
            launcher,
            quote_path(&converted),
            quote_path(&dex)
        );
        context
            .run_tool(DEX2JAR, line, context.toolset.tool_dir(DEX2JAR))
            .await?;

        MissingArtifactError::require("converted archive", &converted)?;
        info!(archive = %converted.display(), "Bytecode converted");
        Ok(())
    }
}
