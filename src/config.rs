//! Runtime configuration for pdfdog
//!
//! Settings come from three layers, highest precedence first:
//! command-line flags, the `PDFDOG_VIEWER` environment variable (viewer only),
//! and an optional TOML file at `~/.config/pdfdog/config.toml`.
//!
//! ```toml
//! poll_interval_ms = 100
//! viewer = "/usr/bin/zathura"
//! delete_attempts = 10
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WatchError};

/// How often the watched file is polled for changes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a viewer gets to exit after a graceful termination request
pub const DEFAULT_TERMINATION_GRACE: Duration = Duration::from_millis(500);

/// Attempts made to delete a transient copy before giving up
pub const DEFAULT_DELETE_ATTEMPTS: u32 = 10;

pub const DEFAULT_DELETE_BACKOFF_BASE: Duration = Duration::from_millis(50);
pub const DEFAULT_DELETE_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Environment variable naming a viewer command, overriding discovery
pub const VIEWER_ENV_VAR: &str = "PDFDOG_VIEWER";

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub poll_interval_ms: Option<u64>,
    pub termination_grace_ms: Option<u64>,
    pub delete_attempts: Option<u32>,
    pub delete_backoff_base_ms: Option<u64>,
    pub delete_backoff_max_ms: Option<u64>,
    pub temp_dir: Option<PathBuf>,
    pub viewer: Option<String>,
    pub viewer_args: Vec<String>,
}

impl ConfigFile {
    /// Parse a config file from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WatchError::config(format!("bad config file: {e}")))
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. The default location is optional and an
    /// absent file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            WatchError::config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }
}

/// Default config file location (`<config dir>/pdfdog/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pdfdog").join("config.toml"))
}

/// Retry policy for deleting a transient copy still held by a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletePolicy {
    pub attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_DELETE_ATTEMPTS,
            backoff_base: DEFAULT_DELETE_BACKOFF_BASE,
            backoff_max: DEFAULT_DELETE_BACKOFF_MAX,
        }
    }
}

/// Resolved settings for one watch session
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub watched: PathBuf,
    pub poll_interval: Duration,
    pub termination_grace: Duration,
    pub delete_policy: DeletePolicy,
    /// Directory for transient copies (platform temp dir when `None`)
    pub temp_dir: Option<PathBuf>,
}

impl WatchConfig {
    pub fn new(watched: impl Into<PathBuf>) -> Self {
        Self {
            watched: watched.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            termination_grace: DEFAULT_TERMINATION_GRACE,
            delete_policy: DeletePolicy::default(),
            temp_dir: None,
        }
    }

    /// Apply values from a config file on top of the defaults
    pub fn with_file(mut self, file: &ConfigFile) -> Result<Self> {
        if let Some(ms) = file.poll_interval_ms {
            self.set_poll_interval_ms(ms)?;
        }
        if let Some(ms) = file.termination_grace_ms {
            self.termination_grace = Duration::from_millis(ms);
        }
        if let Some(attempts) = file.delete_attempts {
            if attempts == 0 {
                return Err(WatchError::config("delete_attempts must be at least 1"));
            }
            self.delete_policy.attempts = attempts;
        }
        if let Some(ms) = file.delete_backoff_base_ms {
            self.delete_policy.backoff_base = Duration::from_millis(ms);
        }
        if let Some(ms) = file.delete_backoff_max_ms {
            self.delete_policy.backoff_max = Duration::from_millis(ms);
        }
        if let Some(dir) = &file.temp_dir {
            self.temp_dir = Some(dir.clone());
        }
        Ok(self)
    }

    /// Set the poll interval. Zero would turn polling into a busy loop.
    pub fn set_poll_interval_ms(&mut self, ms: u64) -> Result<()> {
        if ms == 0 {
            return Err(WatchError::config("poll interval must be at least 1 ms"));
        }
        self.poll_interval = Duration::from_millis(ms);
        Ok(())
    }

    /// Extension of the watched file, used for viewer lookup and copy naming.
    /// Defaults to `pdf`.
    pub fn extension(&self) -> String {
        self.watched
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "pdf".to_string())
    }
}

/// Viewer program chosen by the user, with the arguments that go with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerOverride {
    pub command: String,
    pub args: Vec<String>,
}

/// Pick the viewer override, if any: CLI flag, then environment, then file.
///
/// `viewer_args` from the file belong to the file's `viewer` and are only
/// used when that viewer wins.
pub fn viewer_override(cli: Option<&str>, file: &ConfigFile) -> Option<ViewerOverride> {
    if file.viewer.is_none() && !file.viewer_args.is_empty() {
        tracing::warn!("viewer_args is set without viewer, ignoring it");
    }

    let from_user = cli.map(str::to_string).or_else(|| {
        std::env::var(VIEWER_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
    });

    match (from_user, &file.viewer) {
        (Some(command), file_viewer) => {
            if file_viewer.is_some() && !file.viewer_args.is_empty() {
                tracing::debug!("viewer overridden, config file viewer_args not used");
            }
            Some(ViewerOverride {
                command,
                args: Vec::new(),
            })
        }
        (None, Some(command)) => Some(ViewerOverride {
            command: command.clone(),
            args: file.viewer_args.clone(),
        }),
        (None, None) => None,
    }
}
