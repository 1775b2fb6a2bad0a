//! apkforge - turns Android packages into IDE-ready source projects
//!
//! apkforge orchestrates a toolset of external decompilers. It provisions
//! the tools from source, then drives a package through a fixed pipeline
//! and assembles the results into an Android Studio project skeleton.
//!
//! # Core Concepts
//!
//! - **Toolset**: directory of installed tools, one subdirectory per tool,
//!   described by a [`ToolCatalogue`]
//! - **Workspace**: per-run scratch directory named by a UUID, removed once
//!   the run finishes
//! - **Pipeline**: unpack, convert, decompile, normalize and assemble phases,
//!   run by the [`PipelineOrchestrator`]
//! - **Session**: transactional ownership of the workspace and output; a
//!   failed run leaves nothing behind
//!
//! # Example Usage
//!
//! ```no_run
//! use apkforge::{ApkforgeConfig, DecompileService, DecompilerKind, PipelineRequest};
//! use apkforge::runner::ShellRunner;
//! use apkforge::toolset::ToolsetLayout;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ApkforgeConfig::default();
//! let catalogue = Arc::new(config.load_catalogue()?);
//! let service = DecompileService::new(
//!     Arc::new(ShellRunner::new()),
//!     catalogue,
//!     ToolsetLayout::new(&config.toolset_dir),
//!     &config.work_dir,
//! );
//!
//! let request = PipelineRequest::new(DecompilerKind::Jadx, "app.apk", "app-project");
//! let project = service.decompile(request).await?;
//! println!("Project written to {}", project.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`runner`]: external command execution
//! - [`workspace`]: per-run directories, file tree and archive helpers
//! - [`toolset`]: tool catalogue, installation, update and verification
//! - [`pipeline`]: decompilation phases and the service running them
//! - [`session`]: commit and rollback of a decompilation run

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod session;
pub mod toolset;
pub mod util;
pub mod workspace;

pub use config::{ApkforgeConfig, ConfigError};
pub use error::{
    ArchiveError, IoError, MissingArtifactError, ProcessError, RequestError, VerificationError,
    WorkspaceError,
};
pub use pipeline::{DecompileService, DecompilerKind, PipelineOrchestrator, PipelineRequest};
pub use session::DecompileSession;
pub use toolset::{Provisioner, ToolCatalogue, ToolsetLayout};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
