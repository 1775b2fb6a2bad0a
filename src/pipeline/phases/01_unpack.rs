use crate::pipeline::context::DecompileContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::runner::quote_path;
use crate::toolset::catalogue::APKTOOL;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

const APKTOOL_JAR: &str = "apktool-cli-all.jar";

/// Runs apktool twice: once keeping resources and the compiled bytecode, once
/// producing the text form of the bytecode
pub struct UnpackPhase;

#[async_trait]
impl WorkflowPhase for UnpackPhase {
    fn name(&self) -> &'static str {
        "unpack"
    }

    async fn execute(&self, context: &mut DecompileContext) -> Result<()> {
        let apktool_dir = context.toolset.tool_dir(APKTOOL);
        let jar = if cfg!(windows) {
            APKTOOL_JAR.to_string()
        } else {
            format!("./{}", APKTOOL_JAR)
        };
        let package = quote_path(&context.request.package);

        let unpack = format!(
            "java -jar {} d -f -s -m -k -o {} {}",
            jar,
            quote_path(&context.workspace.unpacked()),
            package
        );
        context.run_tool(APKTOOL, unpack, apktool_dir.clone()).await?;

        let disassemble = format!(
            "java -jar {} d -f --no-assets --no-res -m -o {} {}",
            jar,
            quote_path(&context.workspace.disassembled()),
            package
        );
        context.run_tool(APKTOOL, disassemble, apktool_dir).await?;

        debug!(
            unpacked = %context.workspace.unpacked().display(),
            disassembled = %context.workspace.disassembled().display(),
            "Package unpacked"
        );
        Ok(())
    }
}
