use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::exit::ToolExit;

/// The kind of primitive operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
    Create,
    Delete,
    Open,
    Copy,
    CreateTemp,
    List,
    Exists,
    SetCurrentDirectory,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Open => "open",
            Self::Copy => "copy",
            Self::CreateTemp => "create temporary directory",
            Self::List => "list",
            Self::Exists => "stat",
            Self::SetCurrentDirectory => "change directory",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{operation} failed for {}: {source}", .path.display())]
    Io {
        operation: Operation,
        path:      PathBuf,
        #[source]
        source:    io::Error,
    },

    #[error(transparent)]
    Exit(#[from] ToolExit),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(operation: Operation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Numeric OS error code of the underlying failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            Self::Exit(_) => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Io { operation, .. } => Some(*operation),
            Self::Exit(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Exit(_) => None,
        }
    }

    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Exit(_) => None,
        }
    }

    /// True when the primitive reported that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        self.io_source()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
    }

    pub fn as_tool_exit(&self) -> Option<&ToolExit> {
        match self {
            Self::Exit(exit) => Some(exit),
            Self::Io { .. } => None,
        }
    }
}

/// Wrap an `io::Result` with the operation and path that produced it.
pub fn map_io<T>(operation: Operation, path: &Path, result: io::Result<T>) -> Result<T> {
    result.map_err(|e| Error::io(operation, path, e))
}
