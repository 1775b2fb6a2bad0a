//! Clones or updates tool checkouts through git

use super::catalogue::SourceLocation;
use crate::error::IoError;
use crate::runner::{quote_path, CommandRunner, ToolCommand};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct SourceFetcher {
    runner: Arc<dyn CommandRunner>,
}

impl SourceFetcher {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Brings `checkout` up to date with `source`
    ///
    /// Clones a single branch when the checkout has no `.git` directory yet,
    /// otherwise pulls that branch.
    pub async fn fetch(&self, tool: &str, source: &SourceLocation, checkout: &Path) -> Result<()> {
        let command = if checkout.join(".git").is_dir() {
            info!(tool = %tool, branch = %source.branch, "Pulling");
            ToolCommand::new(tool, format!("git pull origin {}", source.branch), checkout)
        } else {
            info!(tool = %tool, url = %source.url, branch = %source.branch, "Cloning");
            let parent = checkout.parent().unwrap_or(checkout);
            fs::create_dir_all(parent).map_err(|e| IoError::new("fetch.create_parent", parent, e))?;
            ToolCommand::new(
                tool,
                format!(
                    "git clone --branch {} --single-branch {} {}",
                    source.branch,
                    source.url,
                    quote_path(checkout)
                ),
                parent,
            )
        };

        self.runner
            .run(&command)
            .await
            .with_context(|| format!("Could not fetch {} from {}", tool, source.url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;
    use tempfile::TempDir;

    fn source() -> SourceLocation {
        SourceLocation {
            url: "https://example.com/jadx.git".to_string(),
            branch: "master".to_string(),
        }
    }

    #[tokio::test]
    async fn test_clones_missing_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let checkout = temp_dir.path().join("repos/jadx");
        let runner = Arc::new(ScriptedRunner::new());

        SourceFetcher::new(runner.clone())
            .fetch("jadx", &source(), &checkout)
            .await
            .unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0]
            .line
            .starts_with("git clone --branch master --single-branch https://example.com/jadx.git"));
        assert_eq!(invocations[0].working_dir, temp_dir.path().join("repos"));
        assert!(temp_dir.path().join("repos").is_dir());
    }

    #[tokio::test]
    async fn test_pulls_existing_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let checkout = temp_dir.path().join("jadx");
        fs::create_dir_all(checkout.join(".git")).unwrap();
        let runner = Arc::new(ScriptedRunner::new());

        SourceFetcher::new(runner.clone())
            .fetch("jadx", &source(), &checkout)
            .await
            .unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations[0].line, "git pull origin master");
        assert_eq!(invocations[0].working_dir, checkout);
    }

    #[tokio::test]
    async fn test_fetch_failure_names_tool() {
        let temp_dir = TempDir::new().unwrap();
        let runner = Arc::new(ScriptedRunner::new().fail_on("git clone"));

        let err = SourceFetcher::new(runner)
            .fetch("jadx", &source(), &temp_dir.path().join("jadx"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Could not fetch jadx"));
        assert!(err.downcast_ref::<crate::error::ProcessError>().is_some());
    }
}
