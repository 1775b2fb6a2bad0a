//! Per-run workspace and the file operations that populate it
//!
//! A [`Workspace`] is a uniquely named directory under the configured work
//! root. Every intermediate artifact of a decompilation run lives inside it,
//! at the paths named by [`WorkspaceLayout`].

pub mod archive;
pub mod fsops;

pub use archive::{extract_archive, pack_archive};
pub use fsops::{
    copy_file, copy_tree, copy_tree_excluding, delete_tree, empty_tree, is_populated_dir, VCS_DIRS,
};

use crate::error::IoError;
use std::fs;
use std::path::{self, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Named paths inside a workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resources, manifest, native libraries, assets and compiled bytecode
    pub fn unpacked(&self) -> PathBuf {
        self.root.join("unpacked")
    }

    pub fn manifest(&self) -> PathBuf {
        self.unpacked().join("AndroidManifest.xml")
    }

    pub fn dex(&self) -> PathBuf {
        self.unpacked().join("classes.dex")
    }

    pub fn resources(&self) -> PathBuf {
        self.unpacked().join("res")
    }

    pub fn assets(&self) -> PathBuf {
        self.unpacked().join("assets")
    }

    pub fn native_libs(&self) -> PathBuf {
        self.unpacked().join("lib")
    }

    /// Text form of the bytecode
    pub fn disassembled(&self) -> PathBuf {
        self.root.join("disassembled")
    }

    pub fn smali(&self) -> PathBuf {
        self.disassembled().join("smali")
    }

    pub fn converted_jar(&self) -> PathBuf {
        self.root.join("converted.jar")
    }

    pub fn sources(&self) -> PathBuf {
        self.root.join("sources")
    }

    /// Project skeleton the artifacts are merged into
    pub fn template(&self) -> PathBuf {
        self.root.join("template")
    }

    pub fn template_main(&self) -> PathBuf {
        self.template().join("app").join("src").join("main")
    }

    pub fn template_manifest(&self) -> PathBuf {
        self.template_main().join("AndroidManifest.xml")
    }

    pub fn template_resources(&self) -> PathBuf {
        self.template_main().join("res")
    }

    pub fn template_assets(&self) -> PathBuf {
        self.template_resources().join("assets")
    }

    pub fn template_java(&self) -> PathBuf {
        self.template_main().join("java")
    }

    pub fn template_smali(&self) -> PathBuf {
        self.template_java().join("smali")
    }

    pub fn template_libraries(&self) -> PathBuf {
        self.template_java().join("libraries")
    }
}

/// Disposable directory owned by one run
#[derive(Debug)]
pub struct Workspace {
    run_id: Uuid,
    layout: WorkspaceLayout,
}

impl Workspace {
    /// Creates `<work_root>/<uuid>` along with any missing parents
    ///
    /// The workspace root is always absolute.
    pub fn create(work_root: &Path) -> Result<Self, IoError> {
        let work_root = path::absolute(work_root)
            .map_err(|e| IoError::new("workspace.resolve", work_root, e))?;
        let run_id = Uuid::new_v4();
        let root = work_root.join(run_id.to_string());
        fs::create_dir_all(&root).map_err(|e| IoError::new("workspace.create", &root, e))?;
        debug!(run_id = %run_id, root = %root.display(), "Created workspace");
        Ok(Self {
            run_id,
            layout: WorkspaceLayout::new(root),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Deletes the workspace tree; safe to call more than once
    pub fn destroy(&self) -> Result<(), IoError> {
        delete_tree(self.root())?;
        debug!(run_id = %self.run_id, "Removed workspace");
        Ok(())
    }
}
