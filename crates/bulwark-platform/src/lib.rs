//! Host platform detection and process primitives.

pub use command::ProcessCommand;
pub use error::{ProcessError, Result};
pub use os::OperatingSystem;
pub use process::{LocalProcessManager, ProcessManager, Signal};

pub mod command;
mod error;
pub mod os;
pub mod process;
