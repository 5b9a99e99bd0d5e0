//! The watch loop
//!
//! Polls the watched file and, on every detected change, retires the current
//! viewer and copy before snapshotting the file and launching a new viewer.
//! Exactly one (viewer, copy) pair is tracked at a time.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use super::detector::{ChangeDetector, WatchTarget};
use super::retire::Retirement;
use super::snapshot::{SnapshotMaker, TransientCopy};
use crate::config::WatchConfig;
use crate::error::Result;
use crate::viewer::{ViewerCommand, ViewerProcess};

/// Where the loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Polling,
    Transitioning,
    ShuttingDown,
    Failed,
}

/// Result of a single poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Unchanged,
    Relaunched { pid: u32, copy: std::path::PathBuf },
}

/// Why the loop stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Interrupted,
}

#[derive(Debug, Default)]
struct ActivePair {
    viewer: Option<ViewerProcess>,
    copy: Option<TransientCopy>,
}

impl ActivePair {
    fn is_empty(&self) -> bool {
        self.viewer.is_none() && self.copy.is_none()
    }
}

pub struct WatchLoop {
    target: WatchTarget,
    detector: ChangeDetector,
    snapshots: SnapshotMaker,
    retirement: Retirement,
    viewer: ViewerCommand,
    active: ActivePair,
    state: LoopState,
}

impl WatchLoop {
    pub fn new(config: &WatchConfig, viewer: ViewerCommand) -> Self {
        Self {
            target: WatchTarget::new(&config.watched),
            detector: ChangeDetector::new(config.poll_interval),
            snapshots: SnapshotMaker::new(config.temp_dir.clone(), &config.extension()),
            retirement: Retirement::new(config.termination_grace, config.delete_policy),
            viewer,
            active: ActivePair::default(),
            state: LoopState::Polling,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn current_copy(&self) -> Option<&Path> {
        self.active.copy.as_ref().map(TransientCopy::path)
    }

    pub fn viewer_pid(&self) -> Option<u32> {
        self.active.viewer.as_ref().map(ViewerProcess::pid)
    }

    /// Poll once and, if the file changed, swap in a new copy and viewer.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let detection = self.detector.poll(&self.target);
        match detection.modified {
            Some(modified) if detection.changed => self.transition(modified),
            _ => Ok(StepOutcome::Unchanged),
        }
    }

    fn transition(&mut self, modified: SystemTime) -> Result<StepOutcome> {
        self.state = LoopState::Transitioning;
        tracing::debug!(
            modified = %chrono::DateTime::<chrono::Local>::from(modified).format("%H:%M:%S%.3f"),
            "change detected"
        );

        // Recorded before copying so a failed transition is not replayed
        self.target.record(modified);

        self.retire()?;

        let copy = self.snapshots.snapshot(self.target.path())?;
        let copy_path = copy.path().to_path_buf();
        self.active.copy = Some(copy);

        tracing::info!("View: {}", copy_path.display());
        let viewer = ViewerProcess::launch(&self.viewer, &copy_path)?;
        let pid = viewer.pid();
        tracing::info!("Viewer PID: {pid}");
        self.active.viewer = Some(viewer);

        self.state = LoopState::Polling;
        Ok(StepOutcome::Relaunched {
            pid,
            copy: copy_path,
        })
    }

    /// Stop the current viewer and delete the current copy.
    ///
    /// On failure the pair stays tracked so a later retirement can retry.
    pub fn retire(&mut self) -> Result<()> {
        if self.active.is_empty() {
            return Ok(());
        }
        self.retirement
            .retire(self.active.viewer.as_mut(), self.active.copy.as_ref())?;
        self.active = ActivePair::default();
        Ok(())
    }

    /// Run until `running` is cleared or a step fails.
    ///
    /// Both exits retire the current pair. Cleanup problems on the way out
    /// are logged and never replace the error that ended the loop.
    pub fn run(&mut self, running: &AtomicBool) -> Result<LoopExit> {
        tracing::info!("Filename: {}", self.target.path().display());
        tracing::info!("Command: {}", self.viewer);

        while running.load(Ordering::SeqCst) {
            if let Err(err) = self.step() {
                self.state = LoopState::Failed;
                if let Err(cleanup) = self.retire() {
                    tracing::warn!(error = %cleanup, "cleanup after failure incomplete");
                }
                return Err(err);
            }
        }

        self.state = LoopState::ShuttingDown;
        tracing::info!("Interrupted, shutting down");
        if let Err(cleanup) = self.retire() {
            tracing::warn!(error = %cleanup, "cleanup on shutdown incomplete");
        }
        Ok(LoopExit::Interrupted)
    }
}

impl Drop for WatchLoop {
    fn drop(&mut self) {
        if let Err(e) = self.retire() {
            tracing::warn!(error = %e, "transient copy left behind");
        }
    }
}
