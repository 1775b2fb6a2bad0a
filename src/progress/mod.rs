//! Progress reporting for provisioning and decompilation runs

mod handler;
mod logging;

pub use handler::{NoOpHandler, ProgressEvent, ProgressHandler, ToolState};
pub use logging::LoggingHandler;
