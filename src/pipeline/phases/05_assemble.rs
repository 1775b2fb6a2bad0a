use crate::error::MissingArtifactError;
use crate::pipeline::context::DecompileContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::workspace::{copy_file, copy_tree, extract_archive, pack_archive};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

/// Merges the intermediate artifacts into the project skeleton and promotes
/// the result to the output location
pub struct AssemblePhase;

#[async_trait]
impl WorkflowPhase for AssemblePhase {
    fn name(&self) -> &'static str {
        "assemble"
    }

    async fn execute(&self, context: &mut DecompileContext) -> Result<()> {
        let ws = &context.workspace;

        let skeleton = context.toolset.skeleton_archive();
        MissingArtifactError::require("project skeleton", &skeleton)?;
        extract_archive(&skeleton, &ws.template())
            .context("Could not extract the project skeleton")?;

        MissingArtifactError::require("manifest", &ws.manifest())?;
        copy_file(&ws.manifest(), &ws.template_manifest())?;

        MissingArtifactError::require("resources", &ws.resources())?;
        copy_tree(&ws.resources(), &ws.template_resources())?;

        copy_tree(&ws.sources(), &ws.template_java())?;

        copy_optional("native libraries", &ws.native_libs(), &ws.template_libraries())?;
        copy_optional("disassembled bytecode", &ws.smali(), &ws.template_smali())?;
        copy_optional("assets", &ws.assets(), &ws.template_assets())?;

        let destination = context.request.destination();
        if context.request.archive {
            pack_archive(&ws.template(), &destination)?;
        } else {
            copy_tree(&ws.template(), &destination)?;
        }
        info!(output = %destination.display(), "Project assembled");

        context.promoted = Some(destination);
        Ok(())
    }
}

fn copy_optional(artifact: &str, source: &Path, destination: &Path) -> Result<()> {
    if !source.is_dir() {
        warn!(artifact, path = %source.display(), "Optional artifact not present, skipping");
        return Ok(());
    }
    copy_tree(source, destination)?;
    Ok(())
}
