//! File copy with a manual fallback.
//!
//! A native copy that fails for a diagnosed reason is retried as a plain
//! open-read-write loop, which succeeds in cases the OS copy primitive
//! refuses (read-only attributes on the destination, for one). If that also
//! fails, a partially written destination is removed before the failure is
//! reported.

use std::io;
use std::path::Path;
use std::sync::Arc;

use bulwark_fs::{Entity, Error, File, FileSystem, Handle, OpenMode, Operation, Result};
use tracing::warn;

use crate::classify::Failure;
use crate::file::DecoratedFile;
use crate::report::Event;

impl<D: FileSystem> DecoratedFile<D> {
    pub(crate) fn copy_with_fallback_sync(&self, new_path: &Path) -> Result<Self> {
        match self.delegate.copy_sync(new_path) {
            Ok(copied) => Ok(Self::new(copied, Arc::clone(&self.fs))),
            Err(native) if self.context().category(&native).is_some() => self.fall_back(&native, new_path),
            Err(native) => Err(native),
        }
    }

    // The manual fallback runs on tokio's blocking pool and needs a runtime.
    pub(crate) async fn copy_with_fallback(&self, new_path: &Path) -> Result<Self> {
        let native = match self.delegate.copy(new_path).await {
            Ok(copied) => return Ok(Self::new(copied, Arc::clone(&self.fs))),
            Err(native) => native,
        };
        if self.context().category(&native).is_none() {
            return Err(native);
        }

        // Suppression is tracked per thread, so carry it onto the blocking pool.
        let suppressed = !self.context().policy.should_convert_to_fatal();
        let this = self.clone();
        let new_path = new_path.to_path_buf();
        let fallback = tokio::task::spawn_blocking(move || {
            let policy = Arc::clone(&this.context().policy);
            let _scope = suppressed.then(|| policy.suppress());
            this.fall_back(&native, &new_path)
        });
        match fallback.await {
            Ok(result) => result,
            Err(e) => Err(Error::io(Operation::Copy, self.path(), io::Error::other(e))),
        }
    }

    fn fall_back(&self, native: &Error, new_path: &Path) -> Result<Self> {
        warn!(
            source = %self.path().display(),
            destination = %new_path.display(),
            error = %native,
            "native copy failed, copying bytes manually"
        );
        let destination = Self::new(self.fs.delegate.file(new_path), Arc::clone(&self.fs));
        let error = match self.copy_bytes(&destination) {
            Ok(()) => {
                self.context().reporter.send(Event::COPY_FALLBACK);
                return Ok(destination);
            }
            Err(error) => error,
        };

        self.fs.delete_if_exists(&destination, true)?;
        if error.as_tool_exit().is_some() {
            return Err(error);
        }
        Err(self.context().intercept(error, || {
            Failure::new(format!(
                "{} failed to copy \"{}\" to \"{}\" due to unknown error",
                self.context().tool_name(),
                self.path().display(),
                destination.path().display()
            ))
            .with_path(self.path())
            .with_path(destination.path())
        }))
    }

    // Both handles are closed on return, before any cleanup runs.
    fn copy_bytes(&self, destination: &Self) -> Result<()> {
        let mut source = self.open_delegate_sync(OpenMode::Read)?;
        let mut sink = destination.open_delegate_sync(OpenMode::Write)?;
        let mut buffer = vec![0u8; self.context().options.get_copy_chunk_size()];
        loop {
            let read = source.read_into(&mut buffer)?;
            if read == 0 {
                break;
            }
            sink.write_from(&buffer[..read])?;
        }
        sink.flush()
    }
}
