//! Process primitives.

use std::io;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;

use crate::command::ProcessCommand;
use crate::error::{ProcessError, Result};

/// Signal delivered by [`ProcessManager::kill_pid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Signal {
    #[default]
    Terminate,
    Kill,
    Interrupt,
}

#[async_trait]
pub trait ProcessManager: Send + Sync + 'static {
    /// Whether `executable` resolves to something that can be launched.
    fn can_run(&self, executable: &Path, working_directory: Option<&Path>) -> Result<bool>;

    /// Deliver `signal` to `pid`; `Ok(false)` when no such process exists.
    fn kill_pid(&self, pid: u32, signal: Signal) -> Result<bool>;

    async fn start(&self, command: &ProcessCommand) -> Result<tokio::process::Child>;

    async fn run(&self, command: &ProcessCommand) -> Result<Output>;

    fn run_sync(&self, command: &ProcessCommand) -> Result<Output>;
}

/// Process manager over `std::process` and `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProcessManager;

impl LocalProcessManager {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl ProcessManager for LocalProcessManager {
    fn can_run(&self, executable: &Path, working_directory: Option<&Path>) -> Result<bool> {
        if executable.is_absolute() || executable.components().count() > 1 {
            let candidate = match working_directory {
                Some(dir) if executable.is_relative() => dir.join(executable),
                _ => executable.to_path_buf(),
            };
            return match std::fs::metadata(&candidate) {
                Ok(metadata) => Ok(metadata.is_file()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(ProcessError::launch(candidate.display().to_string(), e)),
            };
        }

        let found = match working_directory {
            Some(dir) => which::which_in(executable, std::env::var_os("PATH"), dir),
            None => which::which(executable),
        };
        Ok(found.is_ok())
    }

    #[cfg(unix)]
    fn kill_pid(&self, pid: u32, signal: Signal) -> Result<bool> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal as NixSignal, kill};
        use nix::unistd::Pid;

        let raw = i32::try_from(pid).map_err(|_| ProcessError::Signal {
            pid,
            source: io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"),
        })?;
        let signal = match signal {
            Signal::Terminate => NixSignal::SIGTERM,
            Signal::Kill => NixSignal::SIGKILL,
            Signal::Interrupt => NixSignal::SIGINT,
        };
        match kill(Pid::from_raw(raw), signal) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(errno) => Err(ProcessError::Signal {
                pid,
                source: io::Error::from(errno),
            }),
        }
    }

    #[cfg(windows)]
    fn kill_pid(&self, pid: u32, signal: Signal) -> Result<bool> {
        use std::process::{Command, Stdio};

        let mut command = Command::new("taskkill");
        command.args(["/PID", &pid.to_string()]);
        if signal == Signal::Kill {
            command.arg("/F");
        }
        let status = command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ProcessError::Signal { pid, source })?;
        Ok(status.success())
    }

    async fn start(&self, command: &ProcessCommand) -> Result<tokio::process::Child> {
        command
            .to_tokio()
            .spawn()
            .map_err(|e| ProcessError::launch(command.to_string(), e))
    }

    async fn run(&self, command: &ProcessCommand) -> Result<Output> {
        command
            .to_tokio()
            .output()
            .await
            .map_err(|e| ProcessError::launch(command.to_string(), e))
    }

    fn run_sync(&self, command: &ProcessCommand) -> Result<Output> {
        command
            .to_std()
            .output()
            .map_err(|e| ProcessError::launch(command.to_string(), e))
    }
}
