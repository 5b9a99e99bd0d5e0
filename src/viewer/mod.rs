//! External viewer discovery and process management
//!
//! The viewer is an opaque program started as `program [args..] <copy>`.
//! Which program to run is decided once at startup by a [`ViewerResolver`]:
//! an explicit override when one is configured, otherwise the resolver for
//! the running platform.

pub mod process;
pub mod resolve;

use std::borrow::Cow;
use std::path::PathBuf;

pub use process::ViewerProcess;
pub use resolve::{platform_resolver, resolve_viewer, ConfiguredViewer, ViewerResolver};

/// Program and leading arguments used to show a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ViewerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-quoted rendering for log messages
    pub fn display(&self) -> String {
        let program = self.program.to_string_lossy();
        std::iter::once(program)
            .chain(self.args.iter().map(|a| Cow::Borrowed(a.as_str())))
            .map(shell_escape::escape)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ViewerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
