use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{LocalFileSystem, LocalHandle, blocking, probe};
use crate::error::{Operation, Result, map_io};
use crate::primitives::{Entity, File, FileSystem, OpenMode};

#[derive(Clone, Debug)]
pub struct LocalFile {
    fs:   LocalFileSystem,
    path: PathBuf,
}

impl LocalFile {
    pub(crate) fn new(fs: LocalFileSystem, path: PathBuf) -> Self { Self { fs, path } }

    fn options(mode: OpenMode) -> fs::OpenOptions {
        let mut options = fs::OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
        };
        options
    }

    fn create_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                map_io(Operation::Create, parent, fs::create_dir_all(parent))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File: '{}'", self.path.display())
    }
}

impl Entity for LocalFile {
    fn path(&self) -> &Path { &self.path }

    fn exists_sync(&self) -> Result<bool> { probe(&self.path, fs::metadata(&self.path), |m| m.is_file()) }

    fn delete_sync(&self, recursive: bool) -> Result<()> {
        if recursive && self.path.is_dir() {
            return map_io(Operation::Delete, &self.path, fs::remove_dir_all(&self.path));
        }
        map_io(Operation::Delete, &self.path, fs::remove_file(&self.path))
    }
}

#[async_trait]
impl File for LocalFile {
    type Handle = LocalHandle;

    async fn exists(&self) -> Result<bool> {
        probe(&self.path, tokio::fs::metadata(&self.path).await, |m| m.is_file())
    }

    fn create_sync(&self, recursive: bool) -> Result<()> {
        if recursive {
            self.create_parent()?;
        }
        let result = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path);
        map_io(Operation::Create, &self.path, result).map(drop)
    }

    async fn create(&self, recursive: bool) -> Result<()> {
        let this = self.clone();
        blocking(Operation::Create, self.path.clone(), move || this.create_sync(recursive)).await
    }

    async fn delete(&self, recursive: bool) -> Result<()> {
        if recursive && self.path.is_dir() {
            return map_io(
                Operation::Delete,
                &self.path,
                tokio::fs::remove_dir_all(&self.path).await,
            );
        }
        map_io(Operation::Delete, &self.path, tokio::fs::remove_file(&self.path).await)
    }

    fn read_bytes_sync(&self) -> Result<Vec<u8>> { map_io(Operation::Read, &self.path, fs::read(&self.path)) }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        map_io(Operation::Read, &self.path, tokio::fs::read(&self.path).await)
    }

    fn read_string_sync(&self) -> Result<String> {
        map_io(Operation::Read, &self.path, fs::read_to_string(&self.path))
    }

    async fn read_string(&self) -> Result<String> {
        map_io(Operation::Read, &self.path, tokio::fs::read_to_string(&self.path).await)
    }

    fn write_bytes_sync(&self, bytes: &[u8]) -> Result<()> {
        map_io(Operation::Write, &self.path, fs::write(&self.path, bytes))
    }

    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        map_io(Operation::Write, &self.path, tokio::fs::write(&self.path, bytes).await)
    }

    fn write_string_sync(&self, contents: &str) -> Result<()> { self.write_bytes_sync(contents.as_bytes()) }

    async fn write_string(&self, contents: &str) -> Result<()> { self.write_bytes(contents.as_bytes()).await }

    fn open_sync(&self, mode: OpenMode) -> Result<LocalHandle> {
        let file = map_io(Operation::Open, &self.path, Self::options(mode).open(&self.path))?;
        Ok(LocalHandle::new(file, self.path.clone()))
    }

    async fn open(&self, mode: OpenMode) -> Result<LocalHandle> {
        let options = tokio::fs::OpenOptions::from(Self::options(mode));
        let file = map_io(Operation::Open, &self.path, options.open(&self.path).await)?;
        Ok(LocalHandle::new(file.into_std().await, self.path.clone()))
    }

    fn copy_sync(&self, new_path: &Path) -> Result<Self> {
        let target = self.fs.file(new_path);
        map_io(Operation::Copy, &self.path, fs::copy(&self.path, &target.path))?;
        Ok(target)
    }

    async fn copy(&self, new_path: &Path) -> Result<Self> {
        let target = self.fs.file(new_path);
        map_io(
            Operation::Copy,
            &self.path,
            tokio::fs::copy(&self.path, &target.path).await,
        )?;
        Ok(target)
    }
}
