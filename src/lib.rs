pub mod config;
pub mod error;
pub mod logging;
pub mod viewer;
pub mod watch;

pub use error::{Result, WatchError};
