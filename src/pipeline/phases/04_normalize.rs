use crate::error::MissingArtifactError;
use crate::pipeline::context::DecompileContext;
use crate::pipeline::decompiler::Normalization;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::workspace::{copy_tree, delete_tree, extract_archive, is_populated_dir};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Reconciles decompiler-specific output layouts into a flat `sources/` tree
pub struct NormalizePhase;

#[async_trait]
impl WorkflowPhase for NormalizePhase {
    fn name(&self) -> &'static str {
        "normalize"
    }

    async fn execute(&self, context: &mut DecompileContext) -> Result<()> {
        let sources = context.workspace.sources();

        match context.request.decompiler.spec().normalization {
            Normalization::None => {}
            Normalization::ExtractArchive => {
                let converted = context.workspace.converted_jar();
                let name = converted
                    .file_name()
                    .context("Converted archive has no file name")?;
                extract_in_place(&sources.join(name), &sources)?;
            }
            Normalization::FlattenSubdir(subdir) => {
                flatten(&sources.join(subdir), &sources)?;
            }
        }

        if !is_populated_dir(&sources) {
            return Err(MissingArtifactError {
                artifact: "decompiled sources",
                path: sources,
            }
            .into());
        }
        Ok(())
    }
}

fn extract_in_place(archive: &Path, destination: &Path) -> Result<()> {
    MissingArtifactError::require("decompiler output archive", archive)?;
    extract_archive(archive, destination)?;
    delete_tree(archive)?;
    debug!(archive = %archive.display(), "Extracted decompiler output");
    Ok(())
}

fn flatten(nested: &Path, destination: &Path) -> Result<()> {
    MissingArtifactError::require("decompiler output directory", nested)?;
    copy_tree(nested, destination)?;
    delete_tree(nested)?;
    debug!(nested = %nested.display(), "Flattened decompiler output");
    Ok(())
}
