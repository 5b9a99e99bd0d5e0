//! Error types for the watch lifecycle.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watching, copying, and viewing a file.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Cannot determine a viewer for '.{extension}' files: {reason}")]
    ViewerResolution { extension: String, reason: String },

    #[error("Failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch viewer {}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WatchError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WatchError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        WatchError::Config {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
