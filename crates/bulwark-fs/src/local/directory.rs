use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{LocalFile, LocalFileSystem, blocking, probe};
use crate::error::{Operation, Result, map_io};
use crate::primitives::{Directory, Entity};

#[derive(Clone, Debug)]
pub struct LocalDirectory {
    fs:   LocalFileSystem,
    path: PathBuf,
}

impl LocalDirectory {
    pub(crate) fn new(fs: LocalFileSystem, path: PathBuf) -> Self { Self { fs, path } }
}

impl fmt::Display for LocalDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directory: '{}'", self.path.display())
    }
}

impl Entity for LocalDirectory {
    fn path(&self) -> &Path { &self.path }

    fn exists_sync(&self) -> Result<bool> { probe(&self.path, fs::metadata(&self.path), |m| m.is_dir()) }

    fn delete_sync(&self, recursive: bool) -> Result<()> {
        let result = if recursive {
            fs::remove_dir_all(&self.path)
        } else {
            fs::remove_dir(&self.path)
        };
        map_io(Operation::Delete, &self.path, result)
    }
}

#[async_trait]
impl Directory for LocalDirectory {
    type File = LocalFile;

    async fn exists(&self) -> Result<bool> {
        probe(&self.path, tokio::fs::metadata(&self.path).await, |m| m.is_dir())
    }

    fn create_sync(&self, recursive: bool) -> Result<()> {
        let result = if recursive {
            fs::create_dir_all(&self.path)
        } else {
            fs::create_dir(&self.path)
        };
        map_io(Operation::Create, &self.path, result)
    }

    async fn create(&self, recursive: bool) -> Result<()> {
        let result = if recursive {
            tokio::fs::create_dir_all(&self.path).await
        } else {
            tokio::fs::create_dir(&self.path).await
        };
        map_io(Operation::Create, &self.path, result)
    }

    async fn delete(&self, recursive: bool) -> Result<()> {
        let result = if recursive {
            tokio::fs::remove_dir_all(&self.path).await
        } else {
            tokio::fs::remove_dir(&self.path).await
        };
        map_io(Operation::Delete, &self.path, result)
    }

    fn create_temp_sync(&self, prefix: &str) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.path);
        let temp = map_io(Operation::CreateTemp, &self.path, temp)?;
        Ok(Self::new(self.fs.clone(), temp.keep()))
    }

    async fn create_temp(&self, prefix: &str) -> Result<Self> {
        let this = self.clone();
        let prefix = prefix.to_owned();
        blocking(Operation::CreateTemp, self.path.clone(), move || {
            this.create_temp_sync(&prefix)
        })
        .await
    }

    fn list_sync(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in map_io(Operation::List, &self.path, fs::read_dir(&self.path))? {
            entries.push(map_io(Operation::List, &self.path, entry)?.path());
        }
        entries.sort();
        Ok(entries)
    }

    async fn list(&self) -> Result<Vec<PathBuf>> {
        let mut reader = map_io(Operation::List, &self.path, tokio::fs::read_dir(&self.path).await)?;
        let mut entries = Vec::new();
        while let Some(entry) = map_io(Operation::List, &self.path, reader.next_entry().await)? {
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }

    fn child_file(&self, name: &str) -> LocalFile { LocalFile::new(self.fs.clone(), self.path.join(name)) }

    fn child_directory(&self, name: &str) -> Self { Self::new(self.fs.clone(), self.path.join(name)) }
}
