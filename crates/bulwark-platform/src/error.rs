use std::io;

use bulwark_fs::ToolExit;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessError>;

/// Failure of a process primitive.
///
/// Kept apart from file-system errors so callers can tell a failed launch
/// from a failed read.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to run {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source:  io::Error,
    },

    #[error("failed to signal process {pid}: {source}")]
    Signal {
        pid:    u32,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Exit(#[from] ToolExit),
}

impl ProcessError {
    pub fn launch(command: impl Into<String>, source: io::Error) -> Self {
        Self::Launch {
            command: command.into(),
            source,
        }
    }

    pub fn raw_os_error(&self) -> Option<i32> { self.io_source().and_then(io::Error::raw_os_error) }

    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Launch { source, .. } | Self::Signal { source, .. } => Some(source),
            Self::Exit(_) => None,
        }
    }

    pub fn as_tool_exit(&self) -> Option<&ToolExit> {
        match self {
            Self::Exit(exit) => Some(exit),
            _ => None,
        }
    }
}
