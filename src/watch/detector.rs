//! Poll-based change detection on a single file

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// The watched file and the last modification time acted upon.
///
/// `last_modified == None` means nothing has been seen yet, which compares
/// older than any real timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl WatchTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Record the timestamp of a detected change. Never moves backwards.
    pub fn record(&mut self, modified: SystemTime) {
        if self.last_modified.is_none_or(|last| modified > last) {
            self.last_modified = Some(modified);
        }
    }
}

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub changed: bool,
    pub modified: Option<SystemTime>,
}

/// Polls a file's mtime on a fixed interval
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    interval: Duration,
}

impl ChangeDetector {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check the target once, then sleep for the poll interval.
    pub fn poll(&self, target: &WatchTarget) -> Detection {
        let detection = Self::check(target);
        std::thread::sleep(self.interval);
        detection
    }

    /// Compare the file's current mtime with the recorded one, without sleeping.
    ///
    /// A missing path, a directory, or an unreadable mtime all count as
    /// "nothing new to show".
    pub fn check(target: &WatchTarget) -> Detection {
        let unchanged = Detection {
            changed: false,
            modified: target.last_modified,
        };

        let metadata = match std::fs::metadata(&target.path) {
            Ok(m) if m.is_file() => m,
            _ => return unchanged,
        };

        let Ok(modified) = metadata.modified() else {
            return unchanged;
        };

        if target.last_modified.is_none_or(|last| modified > last) {
            Detection {
                changed: true,
                modified: Some(modified),
            }
        } else {
            unchanged
        }
    }
}
