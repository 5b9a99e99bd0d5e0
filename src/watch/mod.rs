//! Watch-copy-launch lifecycle for a single file

pub mod core;
pub mod detector;
pub mod retire;
pub mod snapshot;

pub use self::core::{LoopExit, LoopState, StepOutcome, WatchLoop};
pub use detector::{ChangeDetector, Detection, WatchTarget};
pub use retire::{calculate_backoff, Retirement};
pub use snapshot::{SnapshotMaker, TransientCopy, COPY_PREFIX};
