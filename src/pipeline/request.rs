use super::decompiler::DecompilerKind;
use crate::error::RequestError;
use std::fs;
use std::path::{self, Path, PathBuf};
use tracing::debug;

/// A single decompilation job
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub decompiler: DecompilerKind,
    pub package: PathBuf,
    pub output: PathBuf,
    /// Installation directory for decompilers that are not in the toolset
    pub external_tool_path: Option<PathBuf>,
    /// Write `<output>/<package stem>.zip` instead of a project tree
    pub archive: bool,
    created_output: bool,
}

impl PipelineRequest {
    pub fn new(
        decompiler: DecompilerKind,
        package: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            decompiler,
            package: package.into(),
            output: output.into(),
            external_tool_path: None,
            archive: false,
            created_output: false,
        }
    }

    pub fn with_external_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.external_tool_path = Some(path.into());
        self
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    /// Checks the inputs and makes sure the output directory exists
    ///
    /// Nothing is created unless every input check passes. On success the
    /// package, output and external tool paths are absolute.
    pub fn validate(&mut self) -> Result<(), RequestError> {
        let package = fs::metadata(&self.package)
            .map_err(|_| RequestError::PackageNotFound(self.package.clone()))?;
        if !package.is_file() {
            return Err(RequestError::PackageNotAFile(self.package.clone()));
        }

        if self.decompiler.requires_external_tool() {
            let external = self
                .external_tool_path
                .as_ref()
                .ok_or(RequestError::MissingExternalTool {
                    decompiler: self.decompiler.name(),
                })?;
            if !external.is_dir() {
                return Err(RequestError::ExternalToolNotADirectory(external.clone()));
            }
        }

        if self.output.exists() {
            if !self.output.is_dir() {
                return Err(RequestError::OutputNotADirectory(self.output.clone()));
            }
        } else {
            fs::create_dir_all(&self.output).map_err(|source| RequestError::OutputCreate {
                path: self.output.clone(),
                source,
            })?;
            self.created_output = true;
            debug!(output = %self.output.display(), "Created output directory");
        }

        // Tools run from their own directories, so relative paths would
        // resolve against the wrong base.
        self.package = resolve(&self.package)?;
        self.output = resolve(&self.output)?;
        self.external_tool_path = self.external_tool_path.as_deref().map(resolve).transpose()?;
        Ok(())
    }

    /// Whether [`validate`](Self::validate) created the output directory
    pub fn created_output(&self) -> bool {
        self.created_output
    }

    /// File name stem of the package, used to name archived output
    pub fn package_stem(&self) -> String {
        self.package
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Where the assembled project ends up
    pub fn destination(&self) -> PathBuf {
        if self.archive {
            self.output.join(format!("{}.zip", self.package_stem()))
        } else {
            self.output.clone()
        }
    }
}

/// Absolute form of `path`, without following symlinks
fn resolve(path: &Path) -> Result<PathBuf, RequestError> {
    path::absolute(path).map_err(|source| RequestError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}
