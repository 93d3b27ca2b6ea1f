use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bulwark_fs::{Entity, File, FileSystem, Handle, OpenMode, Result};

use crate::classify::Failure;
use crate::context::Context;
use crate::file_system::Shared;

/// A file whose OS-level failures are diagnosed before they reach the caller.
pub struct DecoratedFile<D: FileSystem> {
    pub(crate) delegate: D::File,
    pub(crate) fs:       Arc<Shared<D>>,
}

impl<D: FileSystem> DecoratedFile<D> {
    pub(crate) fn new(delegate: D::File, fs: Arc<Shared<D>>) -> Self { Self { delegate, fs } }

    pub fn delegate(&self) -> &D::File { &self.delegate }

    pub(crate) fn context(&self) -> &Context { &self.fs.context }

    fn failure(&self, action: &str) -> Failure {
        let path = self.delegate.path();
        Failure::new(format!(
            "{} failed to {action} \"{}\"",
            self.context().tool_name(),
            path.display()
        ))
        .with_path(path)
    }

    /// Open the underlying handle; only the open itself is diagnosed.
    pub(crate) fn open_delegate_sync(&self, mode: OpenMode) -> Result<<D::File as File>::Handle> {
        self.context()
            .guard(self.delegate.open_sync(mode), || self.failure("open a file at"))
    }
}

impl<D: FileSystem> Clone for DecoratedFile<D> {
    fn clone(&self) -> Self {
        Self {
            delegate: self.delegate.clone(),
            fs:       Arc::clone(&self.fs),
        }
    }
}

impl<D: FileSystem> fmt::Display for DecoratedFile<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.delegate, f) }
}

impl<D: FileSystem> fmt::Debug for DecoratedFile<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecoratedFile")
            .field(&self.delegate.path())
            .finish()
    }
}

impl<D: FileSystem> Entity for DecoratedFile<D> {
    fn path(&self) -> &Path { self.delegate.path() }

    fn exists_sync(&self) -> Result<bool> {
        self.context().guard(self.delegate.exists_sync(), || {
            self.failure("check for file existence at")
        })
    }

    fn delete_sync(&self, recursive: bool) -> Result<()> {
        self.context()
            .guard(self.delegate.delete_sync(recursive), || self.failure("delete a file at"))
    }
}

#[async_trait]
impl<D: FileSystem> File for DecoratedFile<D> {
    type Handle = DecoratedHandle<<D::File as File>::Handle>;

    async fn exists(&self) -> Result<bool> {
        let result = self.delegate.exists().await;
        self.context()
            .guard(result, || self.failure("check for file existence at"))
    }

    fn create_sync(&self, recursive: bool) -> Result<()> {
        self.context()
            .guard(self.delegate.create_sync(recursive), || self.create_failure())
    }

    async fn create(&self, recursive: bool) -> Result<()> {
        let result = self.delegate.create(recursive).await;
        self.context().guard(result, || self.create_failure())
    }

    async fn delete(&self, recursive: bool) -> Result<()> {
        let result = self.delegate.delete(recursive).await;
        self.context().guard(result, || self.failure("delete a file at"))
    }

    fn read_bytes_sync(&self) -> Result<Vec<u8>> {
        self.context()
            .guard(self.delegate.read_bytes_sync(), || self.failure("read a file at"))
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        let result = self.delegate.read_bytes().await;
        self.context().guard(result, || self.failure("read a file at"))
    }

    fn read_string_sync(&self) -> Result<String> {
        self.context()
            .guard(self.delegate.read_string_sync(), || self.failure("read a file at"))
    }

    async fn read_string(&self) -> Result<String> {
        let result = self.delegate.read_string().await;
        self.context().guard(result, || self.failure("read a file at"))
    }

    fn write_bytes_sync(&self, bytes: &[u8]) -> Result<()> {
        self.context().guard(self.delegate.write_bytes_sync(bytes), || {
            self.failure("write to a file at")
        })
    }

    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let result = self.delegate.write_bytes(bytes).await;
        self.context().guard(result, || self.failure("write to a file at"))
    }

    fn write_string_sync(&self, contents: &str) -> Result<()> {
        self.context().guard(self.delegate.write_string_sync(contents), || {
            self.failure("write to a file at")
        })
    }

    async fn write_string(&self, contents: &str) -> Result<()> {
        let result = self.delegate.write_string(contents).await;
        self.context().guard(result, || self.failure("write to a file at"))
    }

    fn open_sync(&self, mode: OpenMode) -> Result<Self::Handle> {
        let handle = self.open_delegate_sync(mode)?;
        Ok(DecoratedHandle::new(handle, self.context().clone(), self.path()))
    }

    async fn open(&self, mode: OpenMode) -> Result<Self::Handle> {
        let result = self.delegate.open(mode).await;
        let handle = self
            .context()
            .guard(result, || self.failure("open a file at"))?;
        Ok(DecoratedHandle::new(handle, self.context().clone(), self.path()))
    }

    fn copy_sync(&self, new_path: &Path) -> Result<Self> { self.copy_with_fallback_sync(new_path) }

    async fn copy(&self, new_path: &Path) -> Result<Self> { self.copy_with_fallback(new_path).await }
}

impl<D: FileSystem> DecoratedFile<D> {
    // The user must own the directory the file is created in.
    fn create_failure(&self) -> Failure {
        let path = self.delegate.path();
        let failure = Failure::new(format!(
            "{} failed to create file at \"{}\"",
            self.context().tool_name(),
            path.display()
        ));
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => failure.with_path(parent),
            _ => failure.with_path(path),
        }
    }
}

/// An open stream whose read and write failures are diagnosed.
pub struct DecoratedHandle<H> {
    delegate: H,
    context:  Context,
    path:     PathBuf,
}

impl<H: Handle> DecoratedHandle<H> {
    fn new(delegate: H, context: Context, path: &Path) -> Self {
        Self {
            delegate,
            context,
            path: path.to_path_buf(),
        }
    }

    pub fn into_inner(self) -> H { self.delegate }

    fn failure(&self, action: &str) -> Failure {
        Failure::new(format!(
            "{} failed to {action} \"{}\"",
            self.context.tool_name(),
            self.path.display()
        ))
        .with_path(&self.path)
    }
}

impl<H> fmt::Debug for DecoratedHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecoratedHandle").field(&self.path).finish()
    }
}

impl<H: Handle> Handle for DecoratedHandle<H> {
    fn read_into(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let result = self.delegate.read_into(buffer);
        self.context.guard(result, || self.failure("read a file at"))
    }

    fn write_from(&mut self, buffer: &[u8]) -> Result<()> {
        let result = self.delegate.write_from(buffer);
        self.context.guard(result, || self.failure("write to a file at"))
    }

    fn length(&mut self) -> Result<u64> {
        let result = self.delegate.length();
        self.context.guard(result, || self.failure("read a file at"))
    }

    fn flush(&mut self) -> Result<()> {
        let result = self.delegate.flush();
        self.context.guard(result, || self.failure("write to a file at"))
    }
}
