//! Viewer discovery
//!
//! Priority:
//! 1. Explicit override (`--viewer`, `PDFDOG_VIEWER`, or `viewer` in the config file)
//! 2. The platform's file-type association
//!    - Linux/BSD: `xdg-mime` default application, known viewers, `xdg-open`
//!    - macOS: `open -W -n`
//!    - Windows: `assoc` / `ftype`

pub mod macos;
pub mod windows;
pub mod xdg;

use std::path::Path;

use super::ViewerCommand;
use crate::error::{Result, WatchError};

pub use macos::MacOpenViewer;
pub use windows::WindowsAssocViewer;
pub use xdg::XdgViewer;

/// Finds the program that displays files with a given extension
pub trait ViewerResolver {
    /// `extension` has no leading dot, e.g. `pdf`
    fn resolve(&self, extension: &str) -> Result<ViewerCommand>;

    /// Short name used in log messages
    fn name(&self) -> &'static str;
}

/// A viewer named by the user
#[derive(Debug, Clone)]
pub struct ConfiguredViewer {
    command: String,
    args: Vec<String>,
}

impl ConfiguredViewer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl ViewerResolver for ConfiguredViewer {
    fn resolve(&self, extension: &str) -> Result<ViewerCommand> {
        let command = self.command.trim();
        if command.is_empty() {
            return Err(resolution_error(extension, "configured viewer is empty"));
        }

        let program = which::which(command).map_err(|e| {
            resolution_error(extension, format!("configured viewer '{command}' not found: {e}"))
        })?;

        Ok(ViewerCommand::new(program).with_args(self.args.iter().cloned()))
    }

    fn name(&self) -> &'static str {
        "configured"
    }
}

/// The resolver for the platform this binary was built for
pub fn platform_resolver() -> Option<Box<dyn ViewerResolver>> {
    #[cfg(target_os = "macos")]
    {
        Some(Box::new(MacOpenViewer) as Box<dyn ViewerResolver>)
    }

    #[cfg(windows)]
    {
        Some(Box::new(WindowsAssocViewer) as Box<dyn ViewerResolver>)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Some(Box::new(XdgViewer::from_env()) as Box<dyn ViewerResolver>)
    }

    #[cfg(not(any(unix, windows)))]
    {
        None
    }
}

/// Decide which viewer to run for files with `extension`.
pub fn resolve_viewer(
    override_command: Option<&str>,
    override_args: &[String],
    extension: &str,
) -> Result<ViewerCommand> {
    let resolver: Box<dyn ViewerResolver> = match override_command {
        Some(command) => Box::new(ConfiguredViewer::new(command, override_args.to_vec())),
        None => platform_resolver().ok_or_else(|| {
            resolution_error(extension, "no viewer lookup is available on this platform")
        })?,
    };

    let command = resolver.resolve(extension)?;
    tracing::debug!(resolver = resolver.name(), command = %command, "resolved viewer");
    Ok(command)
}

pub(crate) fn resolution_error(extension: &str, reason: impl Into<String>) -> WatchError {
    WatchError::ViewerResolution {
        extension: extension.to_string(),
        reason: reason.into(),
    }
}

/// First whitespace-separated token of a command line, honouring double quotes.
///
/// `"C:\Program Files\Viewer\view.exe" "%1"` yields `C:\Program Files\Viewer\view.exe`.
pub(crate) fn first_token(command_line: &str) -> Option<String> {
    let line = command_line.trim_start();
    let token = if let Some(rest) = line.strip_prefix('"') {
        rest.split('"').next().unwrap_or_default()
    } else {
        line.split_whitespace().next().unwrap_or_default()
    };

    (!token.is_empty()).then(|| token.to_string())
}

/// Resolve a program name or path to an executable on disk
pub(crate) fn find_program(program: &str) -> Option<std::path::PathBuf> {
    let path = Path::new(program);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    which::which(program).ok()
}
