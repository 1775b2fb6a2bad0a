//! Decompilation pipeline
//!
//! A package moves through `unpack → convert → decompile → normalize →
//! assemble`, each phase a [`WorkflowPhase`] run by the
//! [`PipelineOrchestrator`] inside one workspace.

pub mod context;
pub mod decompiler;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod request;
pub mod service;

pub use context::DecompileContext;
pub use decompiler::{DecompilerInputs, DecompilerKind, DecompilerSpec, LaunchDir, Normalization};
pub use orchestrator::PipelineOrchestrator;
pub use phase_trait::WorkflowPhase;
pub use request::PipelineRequest;
pub use service::DecompileService;
