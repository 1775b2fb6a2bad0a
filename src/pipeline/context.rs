//! State shared by the pipeline phases of one run

use super::decompiler::DecompilerInputs;
use super::request::PipelineRequest;
use crate::runner::{CommandRunner, ToolCommand};
use crate::toolset::{ToolCatalogue, ToolsetLayout};
use crate::workspace::WorkspaceLayout;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub struct DecompileContext {
    pub request: PipelineRequest,
    pub workspace: WorkspaceLayout,
    pub toolset: ToolsetLayout,
    pub catalogue: Arc<ToolCatalogue>,
    pub runner: Arc<dyn CommandRunner>,
    /// Set by the assemble phase once the project is in place
    pub promoted: Option<PathBuf>,
}

impl DecompileContext {
    pub fn new(
        request: PipelineRequest,
        workspace: WorkspaceLayout,
        toolset: ToolsetLayout,
        catalogue: Arc<ToolCatalogue>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            request,
            workspace,
            toolset,
            catalogue,
            runner,
            promoted: None,
        }
    }

    /// Runs `line` in `working_dir`, attributing failures to `tool`
    pub async fn run_tool(&self, tool: &str, line: String, working_dir: PathBuf) -> Result<()> {
        let command = ToolCommand::new(tool, line, working_dir);
        self.runner
            .run(&command)
            .await
            .with_context(|| format!("{} failed", tool))?;
        Ok(())
    }

    pub fn decompiler_inputs(&self) -> DecompilerInputs {
        DecompilerInputs {
            package: self.request.package.clone(),
            converted_jar: self.workspace.converted_jar(),
            sources: self.workspace.sources(),
            workspace_root: self.workspace.root().to_path_buf(),
            tool_dir: self.toolset.tool_dir(self.request.decompiler.name()),
            catalogue: self.catalogue.clone(),
        }
    }
}
