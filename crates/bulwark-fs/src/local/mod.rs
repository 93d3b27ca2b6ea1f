//! Delegate backed by the host file system.

mod directory;
mod file;
mod handle;

pub use directory::LocalDirectory;
pub use file::LocalFile;
pub use handle::LocalHandle;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Operation, Result};
use crate::path::PathContext;
use crate::primitives::FileSystem;

/// File system over `std::fs` and `tokio::fs`.
///
/// The working directory is owned by this value rather than by the process,
/// so independent instances never observe each other's directory changes.
#[derive(Clone, Debug)]
pub struct LocalFileSystem {
    current: Arc<RwLock<PathBuf>>,
}

impl Default for LocalFileSystem {
    fn default() -> Self { Self::new() }
}

impl LocalFileSystem {
    pub fn new() -> Self {
        let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_current_directory(current)
    }

    pub fn with_current_directory(current: impl Into<PathBuf>) -> Self {
        Self {
            current: Arc::new(RwLock::new(current.into())),
        }
    }

    fn current(&self) -> PathBuf {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current().join(path)
        }
    }
}

impl fmt::Display for LocalFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("LocalFileSystem") }
}

impl FileSystem for LocalFileSystem {
    type File = LocalFile;
    type Directory = LocalDirectory;

    fn file(&self, path: impl AsRef<Path>) -> LocalFile {
        LocalFile::new(self.clone(), self.resolve(path.as_ref()))
    }

    fn directory(&self, path: impl AsRef<Path>) -> LocalDirectory {
        LocalDirectory::new(self.clone(), self.resolve(path.as_ref()))
    }

    fn current_directory(&self) -> LocalDirectory { LocalDirectory::new(self.clone(), self.current()) }

    fn set_current_directory(&self, path: &Path) -> Result<()> {
        let target = self.resolve(path);
        let metadata = std::fs::metadata(&target)
            .map_err(|e| Error::io(Operation::SetCurrentDirectory, &target, e))?;
        if !metadata.is_dir() {
            return Err(Error::io(
                Operation::SetCurrentDirectory,
                &target,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = target;
        Ok(())
    }

    fn system_temp_directory(&self) -> LocalDirectory {
        LocalDirectory::new(self.clone(), std::env::temp_dir())
    }

    fn path_context(&self) -> Arc<PathContext> { Arc::new(PathContext::new(self.current())) }
}

/// Interpret a metadata lookup as an existence check.
pub(crate) fn probe(
    path: &Path,
    metadata: io::Result<std::fs::Metadata>,
    is_kind: impl FnOnce(&std::fs::Metadata) -> bool,
) -> Result<bool> {
    match metadata {
        Ok(metadata) => Ok(is_kind(&metadata)),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => Ok(false),
        Err(e) => Err(Error::io(Operation::Exists, path, e)),
    }
}

/// Run a blocking primitive on tokio's blocking pool.
///
/// Panics when polled outside a Tokio runtime.
pub(crate) async fn blocking<T, F>(operation: Operation, path: PathBuf, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(Error::io(operation, path, io::Error::other(e))),
    }
}
