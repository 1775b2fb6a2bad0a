//! Locating build artifacts in a checkout's output directory

use crate::error::IoError;
use std::fs;
use std::path::{Path, PathBuf};

/// How a located artifact is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// ZIP distribution that is extracted first
    Archive,
    /// Self-contained file; the whole output directory is copied
    Executable,
}

impl ArtifactKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "zip" => Some(Self::Archive),
            "jar" | "exe" => Some(Self::Executable),
            _ => None,
        }
    }
}

/// A build artifact found by [`locate_artifact`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Finds the first file in `dir` whose name contains `pattern`, ignoring case
///
/// Candidates are considered in file-name order so the choice is stable.
/// Files matching the pattern but with an extension that is neither an
/// archive nor an executable are skipped.
pub fn locate_artifact(dir: &Path, pattern: &str) -> Result<Option<Artifact>, IoError> {
    let needle = pattern.to_lowercase();
    let entries = fs::read_dir(dir).map_err(|e| IoError::new("locate_artifact.read_dir", dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::new("locate_artifact.read_entry", dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.to_lowercase().contains(&needle));
        if matches {
            candidates.push(path);
        }
    }
    candidates.sort();

    Ok(candidates.into_iter().find_map(|path| {
        ArtifactKind::from_path(&path).map(|kind| Artifact { path, kind })
    }))
}
