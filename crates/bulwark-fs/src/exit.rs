//! The fatal, user-facing failure signal.

/// A request to terminate the tool with a human readable message.
///
/// Hosts catch this at the top level, print [`ToolExit::message`] and exit
/// with [`ToolExit::exit_code`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolExit {
    message:   String,
    exit_code: i32,
}

impl ToolExit {
    pub const DEFAULT_EXIT_CODE: i32 = 1;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message:   message.into(),
            exit_code: Self::DEFAULT_EXIT_CODE,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn message(&self) -> &str { &self.message }

    pub fn exit_code(&self) -> i32 { self.exit_code }
}
