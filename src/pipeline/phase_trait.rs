use super::context::DecompileContext;
use anyhow::Result;
use async_trait::async_trait;

/// One step of the decompilation pipeline
#[async_trait]
pub trait WorkflowPhase: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &mut DecompileContext) -> Result<()>;
}
