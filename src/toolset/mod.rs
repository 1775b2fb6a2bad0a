//! Toolset provisioning
//!
//! The toolset is a long-lived directory holding one subdirectory per
//! external tool plus the source checkouts they were built from. It is
//! populated by [`Provisioner`] and only read by decompilation runs.

pub mod artifact;
pub mod catalogue;
pub mod fetch;
pub mod layout;
pub mod provisioner;
pub mod verify;

pub use artifact::{locate_artifact, Artifact, ArtifactKind};
pub use catalogue::{BuildStep, InstallLayout, SourceLocation, ToolCatalogue, ToolDescriptor};
pub use fetch::SourceFetcher;
pub use layout::ToolsetLayout;
pub use provisioner::Provisioner;
pub use verify::verify_toolset;
