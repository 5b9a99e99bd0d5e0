//! Retiring a viewer and its transient copy
//!
//! The viewer is asked to exit first, then the copy is deleted. A copy that
//! cannot be deleted is usually still held open by a viewer that has not
//! exited yet (Windows reports a sharing violation), so each failed delete
//! kills the viewer and retries after a backoff, up to a fixed number of
//! attempts.

use std::time::Duration;

use super::snapshot::TransientCopy;
use crate::config::DeletePolicy;
use crate::error::{Result, WatchError};
use crate::viewer::ViewerProcess;

/// Backoff before delete attempt `attempt + 1`.
///
/// Formula: base * 2^(attempt-1), capped at max
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let multiplier = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(multiplier).min(max)
}

#[derive(Debug, Clone)]
pub struct Retirement {
    grace: Duration,
    policy: DeletePolicy,
}

impl Retirement {
    pub fn new(grace: Duration, policy: DeletePolicy) -> Self {
        Self { grace, policy }
    }

    /// Stop `viewer` and delete `copy`. Either may be absent.
    ///
    /// Returns an error only when the copy is still on disk after every
    /// attempt. Problems stopping the viewer are logged; the delete loop
    /// escalates to a kill anyway.
    pub fn retire(
        &self,
        mut viewer: Option<&mut ViewerProcess>,
        copy: Option<&TransientCopy>,
    ) -> Result<()> {
        if let Some(viewer) = viewer.as_deref_mut() {
            tracing::info!(pid = viewer.pid(), "Terminate.");
            if let Err(e) = viewer.shutdown(self.grace) {
                tracing::warn!(pid = viewer.pid(), error = %e, "failed to stop viewer");
            }
        }

        let Some(copy) = copy else {
            return Ok(());
        };

        let mut attempt = 1;
        loop {
            match copy.delete() {
                Ok(()) => {
                    tracing::debug!(path = %copy.path().display(), "deleted transient copy");
                    return Ok(());
                }
                Err(e) if attempt >= self.policy.attempts => {
                    return Err(WatchError::io("delete transient copy", copy.path(), e));
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        path = %copy.path().display(),
                        error = %e,
                        "transient copy still in use, killing viewer"
                    );
                    if let Some(viewer) = viewer.as_deref_mut() {
                        if let Err(e) = viewer.force_kill() {
                            tracing::warn!(pid = viewer.pid(), error = %e, "failed to kill viewer");
                        }
                    }
                    std::thread::sleep(calculate_backoff(
                        attempt,
                        self.policy.backoff_base,
                        self.policy.backoff_max,
                    ));
                    attempt += 1;
                }
            }
        }
    }
}
