use std::fmt;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use bulwark_platform::{ProcessCommand, ProcessManager, Result, Signal};

use crate::classify::Failure;
use crate::context::Context;

/// Process manager whose launch and signal failures are diagnosed.
///
/// Build one through [`Decoration::process_manager`](crate::Decoration::process_manager).
pub struct DecoratedProcessManager<P> {
    delegate: P,
    context:  Context,
}

impl<P: ProcessManager> DecoratedProcessManager<P> {
    pub(crate) fn new(delegate: P, context: Context) -> Self { Self { delegate, context } }

    pub fn delegate(&self) -> &P { &self.delegate }

    fn run_failure(&self, command: &dyn fmt::Display) -> Failure {
        Failure::new(format!(
            "{} failed to run \"{command}\"",
            self.context.tool_name()
        ))
    }

    fn command_failure(&self, command: &ProcessCommand) -> Failure {
        let failure = self.run_failure(command);
        match command.working_directory() {
            Some(dir) => failure.with_path(dir),
            None => failure,
        }
    }
}

impl<P> fmt::Debug for DecoratedProcessManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedProcessManager")
            .field("os", &self.context.os)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: ProcessManager> ProcessManager for DecoratedProcessManager<P> {
    fn can_run(&self, executable: &Path, working_directory: Option<&Path>) -> Result<bool> {
        self.context
            .guard(self.delegate.can_run(executable, working_directory), || {
                self.run_failure(&executable.display())
            })
    }

    fn kill_pid(&self, pid: u32, signal: Signal) -> Result<bool> {
        self.context.guard(self.delegate.kill_pid(pid, signal), || {
            Failure::new(format!(
                "{} failed to kill process {pid}",
                self.context.tool_name()
            ))
        })
    }

    async fn start(&self, command: &ProcessCommand) -> Result<tokio::process::Child> {
        let result = self.delegate.start(command).await;
        self.context.guard(result, || self.command_failure(command))
    }

    async fn run(&self, command: &ProcessCommand) -> Result<Output> {
        let result = self.delegate.run(command).await;
        self.context.guard(result, || self.command_failure(command))
    }

    fn run_sync(&self, command: &ProcessCommand) -> Result<Output> {
        self.context
            .guard(self.delegate.run_sync(command), || self.command_failure(command))
    }
}
