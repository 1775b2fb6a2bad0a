//! On-disk layout of the provisioned toolset

use super::catalogue::ANDROID_PROJECT;
use std::path::{self, Path, PathBuf};

/// Directory name holding source checkouts inside the toolset root
pub const CHECKOUTS_DIR: &str = "repos";

/// Paths inside the toolset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsetLayout {
    root: PathBuf,
}

impl ToolsetLayout {
    /// Relative roots are resolved against the current directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            root: path::absolute(&root).unwrap_or(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Installed artifacts of `tool`
    pub fn tool_dir(&self, tool: &str) -> PathBuf {
        self.root.join(tool)
    }

    pub fn checkouts_dir(&self) -> PathBuf {
        self.root.join(CHECKOUTS_DIR)
    }

    /// Source checkout of `tool`
    pub fn checkout_dir(&self, tool: &str) -> PathBuf {
        self.checkouts_dir().join(tool)
    }

    /// Zipped project skeleton used by assembly
    pub fn skeleton_archive(&self) -> PathBuf {
        self.tool_dir(ANDROID_PROJECT).join("ap.zip")
    }
}
