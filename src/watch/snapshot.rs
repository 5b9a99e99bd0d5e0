//! Private copies of the watched file for the viewer to open

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, WatchError};

/// Name prefix shared by every transient copy
pub const COPY_PREFIX: &str = "pdfdog_";

/// A persisted temp file holding a snapshot of the watched file.
///
/// The file is not removed on drop; whoever holds the value must call
/// [`TransientCopy::delete`].
#[derive(Debug, PartialEq, Eq)]
pub struct TransientCopy {
    path: PathBuf,
}

impl TransientCopy {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the copy from disk. A copy that is already gone counts as deleted.
    pub fn delete(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    #[cfg(test)]
    pub(crate) fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Creates transient copies in a fixed directory
#[derive(Debug, Clone)]
pub struct SnapshotMaker {
    dir: PathBuf,
    suffix: String,
}

impl SnapshotMaker {
    /// `extension` is the watched file's extension without the dot
    pub fn new(dir: Option<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
            suffix: format!(".{extension}"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream the current bytes of `source` into a new uniquely named file.
    pub fn snapshot(&self, source: &Path) -> Result<TransientCopy> {
        let mut input =
            File::open(source).map_err(|e| WatchError::io("open watched file", source, e))?;

        let mut output = tempfile::Builder::new()
            .prefix(COPY_PREFIX)
            .suffix(&self.suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| WatchError::io("create transient copy in", &self.dir, e))?;

        io::copy(&mut input, &mut output)
            .and_then(|_| output.flush())
            .map_err(|e| WatchError::io("copy watched file", source, e))?;

        let (_, path) = output.keep().map_err(|e| {
            let path = e.file.path().to_path_buf();
            WatchError::io("persist transient copy", path, e.error)
        })?;

        Ok(TransientCopy { path })
    }
}
