//! Configuration shared by every decorated object and the interception
//! protocol they all follow.

use std::fmt;
use std::io;
use std::sync::Arc;

use bulwark_fs::{FileSystem, ToolExit};
use bulwark_platform::{OperatingSystem, ProcessError, ProcessManager, os};
use tracing::{debug, warn};

use crate::classify::{self, Category, Failure};
use crate::file_system::DecoratedFileSystem;
use crate::policy::ExitPolicy;
use crate::process::DecoratedProcessManager;
use crate::report::{Reporter, TracingReporter};

/// 64 KiB, the buffer size of a buffered file stream.
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct DecorationOptions {
    tool_name:       String,
    copy_chunk_size: usize,
}

impl Default for DecorationOptions {
    fn default() -> Self { Self::new() }
}

impl DecorationOptions {
    pub fn new() -> Self {
        Self {
            tool_name:       "This tool".to_owned(),
            copy_chunk_size: DEFAULT_COPY_CHUNK_SIZE,
        }
    }

    /// Name used as the subject of failure messages.
    pub fn tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    /// Buffer size of the manual copy fallback. Zero is treated as one.
    pub fn copy_chunk_size(mut self, copy_chunk_size: usize) -> Self {
        self.copy_chunk_size = copy_chunk_size.max(1);
        self
    }

    pub fn get_tool_name(&self) -> &str { &self.tool_name }

    pub fn get_copy_chunk_size(&self) -> usize { self.copy_chunk_size }
}

/// Builder for decorated file systems and process managers.
///
/// Everything built from one `Decoration` shares its operating system tag,
/// exit policy and reporter.
#[derive(Clone)]
pub struct Decoration {
    context: Context,
}

impl Default for Decoration {
    fn default() -> Self { Self::new() }
}

impl Decoration {
    /// Host operating system, the process-wide exit policy and a logging
    /// reporter.
    pub fn new() -> Self {
        Self {
            context: Context {
                os:       os::detect(),
                policy:   ExitPolicy::shared(),
                reporter: Arc::new(TracingReporter),
                options:  DecorationOptions::new(),
            },
        }
    }

    pub fn operating_system(mut self, os: OperatingSystem) -> Self {
        self.context.os = os;
        self
    }

    pub fn policy(mut self, policy: Arc<ExitPolicy>) -> Self {
        self.context.policy = policy;
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.context.reporter = reporter;
        self
    }

    pub fn options(mut self, options: DecorationOptions) -> Self {
        self.context.options = options;
        self
    }

    pub fn file_system<D: FileSystem>(&self, delegate: D) -> DecoratedFileSystem<D> {
        DecoratedFileSystem::new(delegate, self.context.clone())
    }

    pub fn process_manager<P: ProcessManager>(&self, delegate: P) -> DecoratedProcessManager<P> {
        DecoratedProcessManager::new(delegate, self.context.clone())
    }
}

impl fmt::Debug for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoration")
            .field("os", &self.context.os)
            .field("options", &self.context.options)
            .finish_non_exhaustive()
    }
}

/// Errors that may carry an OS failure and can be replaced by a tool exit.
pub(crate) trait Diagnosable: fmt::Display + Sized {
    fn os_failure(&self) -> Option<&io::Error>;
    fn from_exit(exit: ToolExit) -> Self;
}

impl Diagnosable for bulwark_fs::Error {
    fn os_failure(&self) -> Option<&io::Error> { self.io_source() }

    fn from_exit(exit: ToolExit) -> Self { Self::Exit(exit) }
}

impl Diagnosable for ProcessError {
    fn os_failure(&self) -> Option<&io::Error> { self.io_source() }

    fn from_exit(exit: ToolExit) -> Self { Self::Exit(exit) }
}

#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) os:       OperatingSystem,
    pub(crate) policy:   Arc<ExitPolicy>,
    pub(crate) reporter: Arc<dyn Reporter>,
    pub(crate) options:  DecorationOptions,
}

impl Context {
    pub(crate) fn tool_name(&self) -> &str { self.options.get_tool_name() }

    /// Category of `error`, if the table for this OS knows its code.
    pub(crate) fn category<E: Diagnosable>(&self, error: &E) -> Option<Category> {
        let code = error.os_failure()?.raw_os_error()?;
        classify::classify(self.os, code)
    }

    /// Apply the diagnosis protocol to a failed primitive call.
    ///
    /// Unrecognized failures and existing tool exits come back unchanged. A
    /// recognized failure becomes a tool exit, unless the calling thread is
    /// suppressed, in which case the original error comes back.
    pub(crate) fn intercept<E: Diagnosable>(&self, error: E, failure: impl FnOnce() -> Failure) -> E {
        let Some(source) = error.os_failure() else {
            return error;
        };
        let Some(code) = source.raw_os_error() else {
            return error;
        };
        if classify::classify(self.os, code).is_none() {
            return error;
        }
        let Some(diagnosis) = classify::diagnose(self.os, code, source, &failure()) else {
            return error;
        };

        if self.policy.should_convert_to_fatal() {
            warn!(
                os = %self.os,
                code,
                category = ?diagnosis.category(),
                error = %error,
                "OS failure is fatal"
            );
            E::from_exit(ToolExit::new(diagnosis.into_message()))
        } else {
            debug!(
                os = %self.os,
                code,
                category = ?diagnosis.category(),
                "suppressed scope, passing OS failure through"
            );
            error
        }
    }

    pub(crate) fn guard<T, E: Diagnosable>(
        &self,
        result: Result<T, E>,
        failure: impl FnOnce() -> Failure,
    ) -> Result<T, E> {
        result.map_err(|e| self.intercept(e, failure))
    }
}
