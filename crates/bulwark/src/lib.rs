//! Defensive decoration of file-system and process primitives.
//!
//! A decorated file system or process manager behaves exactly like its
//! delegate until a primitive fails. The raw OS error code is then looked up
//! in a per-OS table. Unknown codes reach the caller unchanged. Known codes
//! (disk full, permission denied, file locked, driver fault, missing device)
//! become a [`ToolExit`] carrying a message the user can act on, unless the
//! calling thread is inside an [`ExitPolicy`] suppression scope, in which
//! case the original error is returned.
//!
//! Two failures are recovered from instead: a delete that lost a race with
//! another process, and a native copy that the OS refused but a manual byte
//! copy can still perform.
//!
//! # Example
//!
//! ```no_run
//! use bulwark::{Decoration, DecorationOptions};
//! use bulwark_fs::{File, FileSystem, LocalFileSystem};
//!
//! let fs = Decoration::new()
//!     .options(DecorationOptions::new().tool_name("Forge"))
//!     .file_system(LocalFileSystem::new());
//!
//! match fs.file("build/out.bin").write_bytes_sync(b"artifact") {
//!     Ok(()) => {}
//!     Err(bulwark_fs::Error::Exit(exit)) => {
//!         eprintln!("{}", exit.message());
//!         std::process::exit(exit.exit_code());
//!     }
//!     Err(other) => eprintln!("recoverable: {other}"),
//! }
//! ```

pub mod classify;
mod context;
mod copy;
mod directory;
mod file;
mod file_system;
pub mod policy;
mod process;
pub mod report;
#[cfg(test)]
mod testing;

pub use bulwark_fs::ToolExit;
pub use bulwark_platform::OperatingSystem;
pub use classify::{Category, Diagnosis, Failure, classify, diagnose};
pub use context::{DEFAULT_COPY_CHUNK_SIZE, Decoration, DecorationOptions};
pub use directory::DecoratedDirectory;
pub use file::{DecoratedFile, DecoratedHandle};
pub use file_system::DecoratedFileSystem;
pub use policy::{ExitPolicy, Suppression};
pub use process::DecoratedProcessManager;
pub use report::{Event, NullReporter, Reporter, TracingReporter};
