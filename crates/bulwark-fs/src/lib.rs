//! Primitive file-system contract for Bulwark.
//!
//! The traits in [`primitives`] describe the raw operations a build tool
//! performs on files and directories. [`LocalFileSystem`] implements them over
//! the host file system; decorators elsewhere implement the same traits on
//! top of any delegate.
//!
//! # Example
//!
//! ```no_run
//! use bulwark_fs::{File, FileSystem, LocalFileSystem};
//!
//! let fs = LocalFileSystem::new();
//! let file = fs.file("build/output.txt");
//! file.create_sync(true)?;
//! file.write_string_sync("done")?;
//! # Ok::<(), bulwark_fs::Error>(())
//! ```

mod error;
mod exit;
pub mod local;
pub mod path;
pub mod primitives;

pub use error::{Error, Operation, Result, map_io};
pub use exit::ToolExit;
pub use local::{LocalDirectory, LocalFile, LocalFileSystem, LocalHandle};
pub use path::PathContext;
pub use primitives::{Directory, Entity, File, FileSystem, Handle, OpenMode};
