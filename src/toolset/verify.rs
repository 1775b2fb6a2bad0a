use super::catalogue::ToolCatalogue;
use super::layout::ToolsetLayout;
use crate::error::VerificationError;
use crate::workspace::is_populated_dir;
use tracing::debug;

/// Checks that every catalogued tool has a non-empty directory in the toolset
///
/// Reports all missing tools at once, in catalogue order.
pub fn verify_toolset(
    layout: &ToolsetLayout,
    catalogue: &ToolCatalogue,
) -> Result<(), VerificationError> {
    let missing: Vec<String> = catalogue
        .names()
        .filter(|name| {
            let present = is_populated_dir(&layout.tool_dir(name));
            debug!(tool = %name, present, "Verified tool directory");
            !present
        })
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VerificationError { missing })
    }
}
