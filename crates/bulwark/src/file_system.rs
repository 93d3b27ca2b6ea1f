use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use bulwark_fs::{Entity, FileSystem, PathContext, Result, ToolExit};
use bulwark_platform::OperatingSystem;
use tracing::{trace, warn};

use crate::classify::Failure;
use crate::context::Context;
use crate::directory::DecoratedDirectory;
use crate::file::DecoratedFile;
use crate::policy::ExitPolicy;

/// State shared by a decorated file system and every entity it hands out.
pub(crate) struct Shared<D> {
    pub(crate) delegate: D,
    pub(crate) context:  Context,
    path_cache:          RwLock<Option<Arc<PathContext>>>,
}

impl<D: FileSystem> Shared<D> {
    /// Delete `entity` if it is present, absorbing a delete raced by another
    /// process. Returns whether the entity existed.
    pub(crate) fn delete_if_exists<E: Entity + ?Sized>(&self, entity: &E, recursive: bool) -> Result<bool> {
        if !entity.exists_sync()? {
            return Ok(false);
        }
        let error = match entity.delete_sync(recursive) {
            Ok(()) => return Ok(true),
            Err(error) => error,
        };

        if error.is_not_found() {
            trace!(path = %entity.path().display(), "entity vanished before delete");
            return Ok(true);
        }
        if error.as_tool_exit().is_some() || !self.context.policy.should_convert_to_fatal() {
            return Err(error);
        }
        match entity.exists_sync() {
            Ok(true) => {
                warn!(path = %entity.path().display(), error = %error, "delete failed on existing entity");
                Err(ToolExit::new(format!(
                    "{} failed to delete \"{}\". The file or directory may be on a read-only \
                     volume. Move the project to a writable location and try again.",
                    self.context.tool_name(),
                    entity.path().display()
                ))
                .into())
            }
            _ => Err(error),
        }
    }
}

/// Creates decorated files and directories over a delegate file system.
///
/// Build one through [`Decoration::file_system`](crate::Decoration::file_system).
pub struct DecoratedFileSystem<D> {
    shared: Arc<Shared<D>>,
}

impl<D: FileSystem> DecoratedFileSystem<D> {
    pub(crate) fn new(delegate: D, context: Context) -> Self {
        Self {
            shared: Arc::new(Shared {
                delegate,
                context,
                path_cache: RwLock::new(None),
            }),
        }
    }

    pub fn delegate(&self) -> &D { &self.shared.delegate }

    pub fn operating_system(&self) -> OperatingSystem { self.shared.context.os }

    pub fn policy(&self) -> &Arc<ExitPolicy> { &self.shared.context.policy }

    /// Delete `entity` if it exists.
    ///
    /// A delete that fails because another process removed the entity first
    /// counts as success. Any other failure becomes a tool exit while the
    /// entity is still present, or comes back as is when suppressed.
    pub fn delete_if_exists<E: Entity + ?Sized>(&self, entity: &E, recursive: bool) -> Result<bool> {
        self.shared.delete_if_exists(entity, recursive)
    }
}

impl<D> Clone for DecoratedFileSystem<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: FileSystem> fmt::Display for DecoratedFileSystem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.shared.delegate, f)
    }
}

impl<D: FileSystem> fmt::Debug for DecoratedFileSystem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedFileSystem")
            .field("delegate", &format_args!("{}", self.shared.delegate))
            .field("os", &self.shared.context.os)
            .finish_non_exhaustive()
    }
}

impl<D: FileSystem> FileSystem for DecoratedFileSystem<D> {
    type File = DecoratedFile<D>;
    type Directory = DecoratedDirectory<D>;

    fn file(&self, path: impl AsRef<Path>) -> DecoratedFile<D> {
        DecoratedFile::new(self.shared.delegate.file(path), Arc::clone(&self.shared))
    }

    fn directory(&self, path: impl AsRef<Path>) -> DecoratedDirectory<D> {
        DecoratedDirectory::new(self.shared.delegate.directory(path), Arc::clone(&self.shared))
    }

    fn current_directory(&self) -> DecoratedDirectory<D> {
        DecoratedDirectory::new(self.shared.delegate.current_directory(), Arc::clone(&self.shared))
    }

    fn set_current_directory(&self, path: &Path) -> Result<()> {
        // Held across the change so no reader sees a context for the old directory.
        let mut cache = self
            .shared
            .path_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let context = &self.shared.context;
        context.guard(self.shared.delegate.set_current_directory(path), || {
            Failure::new(format!(
                "{} failed to change the current directory to \"{}\"",
                context.tool_name(),
                path.display()
            ))
            .with_path(path)
        })?;
        *cache = None;
        Ok(())
    }

    fn system_temp_directory(&self) -> DecoratedDirectory<D> {
        DecoratedDirectory::new(self.shared.delegate.system_temp_directory(), Arc::clone(&self.shared))
    }

    fn path_context(&self) -> Arc<PathContext> {
        if let Some(cached) = self
            .shared
            .path_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(cached);
        }
        let mut cache = self
            .shared
            .path_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.get_or_insert_with(|| self.shared.delegate.path_context()))
    }
}
