//! Lifecycle of one external viewer process

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

use super::ViewerCommand;
use crate::error::{Result, WatchError};

/// A running (or recently running) viewer launched on a transient copy
#[derive(Debug)]
pub struct ViewerProcess {
    child: Child,
    program: PathBuf,
    reaped: bool,
}

impl ViewerProcess {
    /// Start `command` with `file` as its final argument.
    ///
    /// The viewer's standard streams are all null.
    pub fn launch(command: &ViewerCommand, file: &Path) -> Result<Self> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| WatchError::Launch {
                program: command.program.clone(),
                source,
            })?;

        Ok(Self {
            child,
            program: command.program.clone(),
            reaped: false,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the process is still running. Reaps it if it has exited.
    pub fn is_alive(&mut self) -> bool {
        if self.reaped {
            return false;
        }
        match self.child.try_wait() {
            Ok(Some(_)) => {
                self.reaped = true;
                false
            }
            Ok(None) => true,
            // Status unknown; assume it is still there so cleanup keeps trying
            Err(_) => true,
        }
    }

    /// Ask the viewer to exit. Does not wait for it.
    pub fn terminate(&mut self) -> io::Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        self.send_terminate()
    }

    #[cfg(unix)]
    fn send_terminate(&mut self) -> io::Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let pid = i32::try_from(self.child.id())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

        match kill(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(io::Error::from(errno)),
        }
    }

    #[cfg(not(unix))]
    fn send_terminate(&mut self) -> io::Result<()> {
        match self.child.kill() {
            Err(e) if e.kind() != io::ErrorKind::InvalidInput => Err(e),
            _ => Ok(()),
        }
    }

    /// Wait up to `grace` for the process to exit. Returns true once it is gone.
    pub fn wait_for_exit(&mut self, grace: Duration) -> io::Result<bool> {
        if self.reaped {
            return Ok(true);
        }
        let exited = self.child.wait_timeout(grace)?.is_some();
        if exited {
            self.reaped = true;
        }
        Ok(exited)
    }

    /// Kill the process unconditionally and reap it.
    pub fn force_kill(&mut self) -> io::Result<()> {
        if self.reaped {
            return Ok(());
        }
        match self.child.kill() {
            Ok(()) => {}
            // Already exited
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e),
        }
        self.child.wait()?;
        self.reaped = true;
        Ok(())
    }

    /// Graceful termination, escalating to a kill after `grace`.
    ///
    /// Returns once the process is confirmed dead.
    pub fn shutdown(&mut self, grace: Duration) -> io::Result<()> {
        self.terminate()?;
        if !self.wait_for_exit(grace)? {
            tracing::debug!(pid = self.pid(), "viewer ignored terminate, killing");
            self.force_kill()?;
        }
        Ok(())
    }
}
