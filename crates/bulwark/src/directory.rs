use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bulwark_fs::{Directory, Entity, FileSystem, Result};

use crate::classify::Failure;
use crate::context::Context;
use crate::file::DecoratedFile;
use crate::file_system::Shared;

/// A directory whose OS-level failures are diagnosed before they reach the
/// caller. Children come back decorated as well.
pub struct DecoratedDirectory<D: FileSystem> {
    delegate: D::Directory,
    fs:       Arc<Shared<D>>,
}

impl<D: FileSystem> DecoratedDirectory<D> {
    pub(crate) fn new(delegate: D::Directory, fs: Arc<Shared<D>>) -> Self { Self { delegate, fs } }

    pub fn delegate(&self) -> &D::Directory { &self.delegate }

    fn context(&self) -> &Context { &self.fs.context }

    fn failure(&self, action: &str) -> Failure {
        let path = self.delegate.path();
        Failure::new(format!(
            "{} failed to {action} \"{}\"",
            self.context().tool_name(),
            path.display()
        ))
        .with_path(path)
    }

    fn temp_failure(&self, prefix: &str) -> Failure {
        Failure::new(format!(
            "{} failed to create a temporary directory with prefix \"{prefix}\"",
            self.context().tool_name()
        ))
        .with_path(self.delegate.path())
    }
}

impl<D: FileSystem> Clone for DecoratedDirectory<D> {
    fn clone(&self) -> Self {
        Self {
            delegate: self.delegate.clone(),
            fs:       Arc::clone(&self.fs),
        }
    }
}

impl<D: FileSystem> fmt::Display for DecoratedDirectory<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.delegate, f) }
}

impl<D: FileSystem> fmt::Debug for DecoratedDirectory<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecoratedDirectory")
            .field(&self.delegate.path())
            .finish()
    }
}

impl<D: FileSystem> Entity for DecoratedDirectory<D> {
    fn path(&self) -> &Path { self.delegate.path() }

    fn exists_sync(&self) -> Result<bool> {
        self.context().guard(self.delegate.exists_sync(), || {
            self.failure("check for directory existence at")
        })
    }

    fn delete_sync(&self, recursive: bool) -> Result<()> {
        self.context().guard(self.delegate.delete_sync(recursive), || {
            self.failure("delete a directory at")
        })
    }
}

#[async_trait]
impl<D: FileSystem> Directory for DecoratedDirectory<D> {
    type File = DecoratedFile<D>;

    async fn exists(&self) -> Result<bool> {
        let result = self.delegate.exists().await;
        self.context()
            .guard(result, || self.failure("check for directory existence at"))
    }

    fn create_sync(&self, recursive: bool) -> Result<()> {
        self.context().guard(self.delegate.create_sync(recursive), || {
            self.failure("create a directory at")
        })
    }

    async fn create(&self, recursive: bool) -> Result<()> {
        let result = self.delegate.create(recursive).await;
        self.context()
            .guard(result, || self.failure("create a directory at"))
    }

    async fn delete(&self, recursive: bool) -> Result<()> {
        let result = self.delegate.delete(recursive).await;
        self.context()
            .guard(result, || self.failure("delete a directory at"))
    }

    fn create_temp_sync(&self, prefix: &str) -> Result<Self> {
        let temp = self
            .context()
            .guard(self.delegate.create_temp_sync(prefix), || self.temp_failure(prefix))?;
        Ok(Self::new(temp, Arc::clone(&self.fs)))
    }

    async fn create_temp(&self, prefix: &str) -> Result<Self> {
        let result = self.delegate.create_temp(prefix).await;
        let temp = self.context().guard(result, || self.temp_failure(prefix))?;
        Ok(Self::new(temp, Arc::clone(&self.fs)))
    }

    fn list_sync(&self) -> Result<Vec<PathBuf>> {
        self.context()
            .guard(self.delegate.list_sync(), || self.failure("list the directory at"))
    }

    async fn list(&self) -> Result<Vec<PathBuf>> {
        let result = self.delegate.list().await;
        self.context()
            .guard(result, || self.failure("list the directory at"))
    }

    fn child_file(&self, name: &str) -> DecoratedFile<D> {
        DecoratedFile::new(self.delegate.child_file(name), Arc::clone(&self.fs))
    }

    fn child_directory(&self, name: &str) -> Self {
        Self::new(self.delegate.child_directory(name), Arc::clone(&self.fs))
    }
}
