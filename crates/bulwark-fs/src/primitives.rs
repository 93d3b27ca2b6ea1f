//! The primitive contract every file-system delegate implements.
//!
//! Decorators implement the very same traits on top of a delegate, so code
//! written against these traits does not care whether it talks to the raw
//! primitives or to a decorated view of them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::path::PathContext;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenMode {
    #[default]
    Read,
    /// Create or truncate.
    Write,
    Append,
}

/// An open, positioned byte stream.
pub trait Handle: Send {
    /// Fill `buffer` from the current position; `Ok(0)` means end of data.
    fn read_into(&mut self, buffer: &mut [u8]) -> Result<usize>;
    fn write_from(&mut self, buffer: &[u8]) -> Result<()>;
    fn length(&mut self) -> Result<u64>;
    fn flush(&mut self) -> Result<()>;
}

/// Anything that lives at a path and can be probed or removed.
pub trait Entity: fmt::Display + Send + Sync {
    fn path(&self) -> &Path;
    /// `Ok(false)` when nothing is at the path; `Err` when the probe itself fails.
    fn exists_sync(&self) -> Result<bool>;
    fn delete_sync(&self, recursive: bool) -> Result<()>;
}

#[async_trait]
pub trait File: Entity + Clone + Sized + 'static {
    type Handle: Handle;

    async fn exists(&self) -> Result<bool>;

    fn create_sync(&self, recursive: bool) -> Result<()>;
    async fn create(&self, recursive: bool) -> Result<()>;

    async fn delete(&self, recursive: bool) -> Result<()>;

    fn read_bytes_sync(&self) -> Result<Vec<u8>>;
    async fn read_bytes(&self) -> Result<Vec<u8>>;

    fn read_string_sync(&self) -> Result<String>;
    async fn read_string(&self) -> Result<String>;

    fn write_bytes_sync(&self, bytes: &[u8]) -> Result<()>;
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()>;

    fn write_string_sync(&self, contents: &str) -> Result<()>;
    async fn write_string(&self, contents: &str) -> Result<()>;

    fn open_sync(&self, mode: OpenMode) -> Result<Self::Handle>;
    async fn open(&self, mode: OpenMode) -> Result<Self::Handle>;

    /// Copy this file to `new_path` and return the copy.
    fn copy_sync(&self, new_path: &Path) -> Result<Self>;
    /// Async form of [`File::copy_sync`]. Implementations may offload work
    /// to tokio's blocking pool, so the future must be polled inside a Tokio
    /// runtime.
    async fn copy(&self, new_path: &Path) -> Result<Self>;
}

#[async_trait]
pub trait Directory: Entity + Clone + Sized + 'static {
    type File: File;

    async fn exists(&self) -> Result<bool>;

    fn create_sync(&self, recursive: bool) -> Result<()>;
    async fn create(&self, recursive: bool) -> Result<()>;

    async fn delete(&self, recursive: bool) -> Result<()>;

    /// Create a uniquely named directory inside this one.
    fn create_temp_sync(&self, prefix: &str) -> Result<Self>;
    async fn create_temp(&self, prefix: &str) -> Result<Self>;

    fn list_sync(&self) -> Result<Vec<PathBuf>>;
    async fn list(&self) -> Result<Vec<PathBuf>>;

    fn child_file(&self, name: &str) -> Self::File;
    fn child_directory(&self, name: &str) -> Self;
}

pub trait FileSystem: fmt::Display + Send + Sync + 'static {
    type File: File;
    type Directory: Directory<File = Self::File>;

    fn file(&self, path: impl AsRef<Path>) -> Self::File;
    fn directory(&self, path: impl AsRef<Path>) -> Self::Directory;

    fn current_directory(&self) -> Self::Directory;
    fn set_current_directory(&self, path: &Path) -> Result<()>;
    fn system_temp_directory(&self) -> Self::Directory;

    fn path_context(&self) -> Arc<PathContext>;
}
