//! Fetch, build, extract and verify cycle that populates the toolset
//!
//! Stages run over the whole catalogue one after another. A tool that fails
//! in one stage is logged with its error chain and skipped by the later
//! stages, so the closing verification reports every broken tool at once.

use super::artifact::{locate_artifact, ArtifactKind};
use super::catalogue::{InstallLayout, SourceLocation, ToolCatalogue, ToolDescriptor};
use super::fetch::SourceFetcher;
use super::layout::ToolsetLayout;
use super::verify::verify_toolset;
use crate::progress::{ProgressEvent, ProgressHandler, ToolState};
use crate::runner::{CommandRunner, ToolCommand};
use crate::workspace::{
    copy_tree, copy_tree_excluding, delete_tree, empty_tree, extract_archive, VCS_DIRS,
};
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Directory inside a build-output directory that archives are extracted to
pub const BUILD_OUTPUT_DIR: &str = "buildOutput";

/// Checkout name used by the compact install
const COMPACT_CHECKOUT: &str = "compact";

pub struct Provisioner {
    runner: Arc<dyn CommandRunner>,
    fetcher: SourceFetcher,
    catalogue: Arc<ToolCatalogue>,
    layout: ToolsetLayout,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl Provisioner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        catalogue: Arc<ToolCatalogue>,
        layout: ToolsetLayout,
    ) -> Self {
        Self {
            fetcher: SourceFetcher::new(runner.clone()),
            runner,
            catalogue,
            layout,
            progress_handler: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn layout(&self) -> &ToolsetLayout {
        &self.layout
    }

    /// Provisions the toolset from scratch
    pub async fn install(&self) -> Result<()> {
        info!(root = %self.layout.root().display(), "Starting installation");
        empty_tree(self.layout.root()).context("Could not empty the toolset directory")?;

        let mut failed = BTreeSet::new();
        self.fetch_all(&mut failed).await;
        self.build_all(&mut failed).await;
        self.extract_all(&mut failed);
        self.verify()
    }

    /// Refreshes checkouts, rebuilds and replaces every installed tool
    pub async fn update(&self) -> Result<()> {
        info!(root = %self.layout.root().display(), "Starting update");

        let mut failed = BTreeSet::new();
        self.fetch_all(&mut failed).await;
        self.build_all(&mut failed).await;
        for tool in self.catalogue.tools() {
            let dir = self.layout.tool_dir(&tool.name);
            empty_tree(&dir)
                .with_context(|| format!("Could not empty the directory of {}", tool.name))?;
        }
        self.extract_all(&mut failed);
        self.verify()
    }

    /// Installs a prebuilt toolset published as a single repository
    pub async fn compact_install(&self, source: &SourceLocation) -> Result<()> {
        info!(url = %source.url, branch = %source.branch, "Starting compact installation");
        empty_tree(self.layout.root()).context("Could not empty the toolset directory")?;

        let checkout = self.layout.checkout_dir(COMPACT_CHECKOUT);
        self.fetcher
            .fetch(COMPACT_CHECKOUT, source, &checkout)
            .await
            .context("Compact installation failed")?;
        copy_tree_excluding(&checkout, self.layout.root(), VCS_DIRS)
            .context("Could not copy the compact toolset into place")?;
        self.verify()
    }

    async fn fetch_all(&self, failed: &mut BTreeSet<String>) {
        for tool in self.catalogue.tools() {
            self.emit_state(&tool.name, ToolState::Fetching);
            let checkout = self.layout.checkout_dir(&tool.name);
            if let Err(e) = self.fetcher.fetch(&tool.name, &tool.source, &checkout).await {
                self.record_failure(&tool.name, "fetch", &e, failed);
            }
        }
    }

    async fn build_all(&self, failed: &mut BTreeSet<String>) {
        for tool in self.catalogue.tools() {
            if failed.contains(&tool.name) {
                continue;
            }
            let Some(build) = &tool.build else {
                continue;
            };

            self.emit_state(&tool.name, ToolState::Building);
            let command =
                ToolCommand::new(&tool.name, &build.command, self.layout.checkout_dir(&tool.name));
            let result = self
                .runner
                .run(&command)
                .await
                .with_context(|| format!("Could not build {}", tool.name));
            if let Err(e) = result {
                self.record_failure(&tool.name, "build", &e, failed);
            }
        }
    }

    fn extract_all(&self, failed: &mut BTreeSet<String>) {
        for tool in self.catalogue.tools() {
            if failed.contains(&tool.name) {
                continue;
            }

            self.emit_state(&tool.name, ToolState::Extracting);
            match self.extract(tool) {
                Ok(()) => self.emit_state(&tool.name, ToolState::Ready),
                Err(e) => self.record_failure(&tool.name, "extract", &e, failed),
            }
        }
    }

    /// Copies the built artifact (or the checkout itself) into the tool directory
    fn extract(&self, tool: &ToolDescriptor) -> Result<()> {
        let checkout = self.layout.checkout_dir(&tool.name);
        let target = self.layout.tool_dir(&tool.name);

        let Some(build) = &tool.build else {
            copy_tree_excluding(&checkout, &target, VCS_DIRS)?;
            return Ok(());
        };

        let output_dir = checkout.join(&build.output_dir);
        let artifact = locate_artifact(&output_dir, &build.output_pattern)?.ok_or_else(|| {
            anyhow!(
                "No build artifact matching '{}' in {}",
                build.output_pattern,
                output_dir.display()
            )
        })?;
        info!(tool = %tool.name, artifact = %artifact.path.display(), "Located build artifact");

        match artifact.kind {
            ArtifactKind::Executable => {
                copy_tree(&output_dir, &target)?;
            }
            ArtifactKind::Archive => {
                let extracted = output_dir.join(BUILD_OUTPUT_DIR);
                delete_tree(&extracted)?;
                extract_archive(&artifact.path, &extracted)?;
                let source = match tool.install {
                    InstallLayout::WholeTree => extracted,
                    InstallLayout::FirstChild => first_child_dir(&extracted)?,
                };
                copy_tree(&source, &target)?;
            }
        }
        Ok(())
    }

    fn verify(&self) -> Result<()> {
        let result = verify_toolset(&self.layout, &self.catalogue);
        self.emit(&ProgressEvent::VerificationComplete {
            missing: result.as_ref().err().map(|e| e.missing.clone()).unwrap_or_default(),
        });
        result?;
        info!("Toolset verified");
        Ok(())
    }

    fn record_failure(
        &self,
        tool: &str,
        stage: &str,
        err: &anyhow::Error,
        failed: &mut BTreeSet<String>,
    ) {
        error!(tool = %tool, stage = %stage, "{:#}", err);
        self.emit_state(tool, ToolState::Failed);
        failed.insert(tool.to_string());
    }

    fn emit_state(&self, tool: &str, state: ToolState) {
        self.emit(&ProgressEvent::ToolStateChanged {
            tool: tool.to_string(),
            state,
        });
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(event);
        }
    }
}

fn first_child_dir(dir: &Path) -> Result<PathBuf> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Could not read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    children.sort();
    children
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Archive extracted to {} has no top-level directory", dir.display()))
}
