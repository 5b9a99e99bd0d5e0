//! Viewer lookup on macOS

use super::{resolution_error, ViewerResolver};
use crate::error::Result;
use crate::viewer::ViewerCommand;

/// Opens files with the default application through `open`.
///
/// `-W` keeps `open` running until the application exits and `-n` asks for
/// a fresh instance per copy. Terminating `open` does not quit the
/// application it started, so a configured viewer gives tighter control.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacOpenViewer;

impl ViewerResolver for MacOpenViewer {
    fn resolve(&self, extension: &str) -> Result<ViewerCommand> {
        let program = which::which("open")
            .map_err(|e| resolution_error(extension, format!("`open` not found: {e}")))?;
        Ok(ViewerCommand::new(program).with_args(["-W", "-n"]))
    }

    fn name(&self) -> &'static str {
        "open"
    }
}
