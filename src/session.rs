//! Scoped ownership of the workspace and output of one decompilation run
//!
//! A [`DecompileSession`] is opened after the request validated and before
//! the first phase runs. [`commit`](DecompileSession::commit) keeps the
//! output and removes the workspace. [`rollback`](DecompileSession::rollback),
//! or dropping an unfinished session, removes the workspace together with
//! everything this run put into the output location.

use crate::error::IoError;
use crate::pipeline::PipelineRequest;
use crate::workspace::{delete_tree, Workspace};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct DecompileSession {
    workspace: Workspace,
    output: PathBuf,
    created_output: bool,
    /// Entries of a pre-existing output directory at session start
    preexisting: BTreeSet<OsString>,
    finished: bool,
}

impl DecompileSession {
    /// Creates the run's workspace under `work_root`
    ///
    /// `request` must already be validated. If the workspace cannot be
    /// created, an output directory made by validation is removed again.
    pub fn begin(work_root: &Path, request: &PipelineRequest) -> Result<Self, IoError> {
        let preexisting = if request.created_output() {
            BTreeSet::new()
        } else {
            list_entries(&request.output)?
        };

        let workspace = match Workspace::create(work_root) {
            Ok(workspace) => workspace,
            Err(e) => {
                if request.created_output() {
                    if let Err(cleanup) = delete_tree(&request.output) {
                        warn!(error = %cleanup, "Could not remove output directory");
                    }
                }
                return Err(e);
            }
        };

        Ok(Self {
            workspace,
            output: request.output.clone(),
            created_output: request.created_output(),
            preexisting,
            finished: false,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Keeps the output and removes the workspace
    pub fn commit(mut self) -> Result<(), IoError> {
        self.finished = true;
        self.workspace.destroy()
    }

    /// Removes the workspace and whatever this run added to the output
    ///
    /// Cleanup continues past individual failures; the first one is returned.
    pub fn rollback(mut self) -> Result<(), IoError> {
        self.finished = true;
        self.undo()
    }

    fn undo(&self) -> Result<(), IoError> {
        let mut first_error = None;
        let mut note = |result: Result<(), IoError>| {
            if let Err(e) = result {
                warn!(error = %e, "Rollback step failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        };

        note(self.workspace.destroy());

        if self.created_output {
            debug!(output = %self.output.display(), "Removing output directory");
            note(delete_tree(&self.output));
        } else {
            match list_entries(&self.output) {
                Ok(entries) => {
                    for added in entries.difference(&self.preexisting) {
                        note(delete_tree(&self.output.join(added)));
                    }
                }
                Err(e) => note(Err(e)),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for DecompileSession {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.undo();
        }
    }
}

fn list_entries(dir: &Path) -> Result<BTreeSet<OsString>, IoError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(IoError::new("session.list_output", dir, e)),
    };
    entries
        .map(|entry| {
            entry
                .map(|e| e.file_name())
                .map_err(|e| IoError::new("session.list_output", dir, e))
        })
        .collect()
}
