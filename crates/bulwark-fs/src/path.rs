//! Path manipulation bound to a working directory.

use std::path::{Component, Path, PathBuf};

/// Path helper resolving relative paths against a fixed working directory.
///
/// A context is a snapshot: it does not follow later working directory
/// changes, callers obtain a fresh one instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathContext {
    current: PathBuf,
}

impl PathContext {
    pub fn new(current: impl Into<PathBuf>) -> Self {
        Self {
            current: current.into(),
        }
    }

    pub fn current(&self) -> &Path { &self.current }

    pub fn separator(&self) -> char { std::path::MAIN_SEPARATOR }

    pub fn is_absolute(&self, path: impl AsRef<Path>) -> bool { path.as_ref().is_absolute() }

    /// Resolve `path` against the working directory and drop `.` and `..`
    /// components lexically.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current.join(path)
        };
        normalize(&joined)
    }

    pub fn join(&self, base: impl AsRef<Path>, child: impl AsRef<Path>) -> PathBuf {
        base.as_ref().join(child)
    }

    pub fn dirname(&self, path: impl AsRef<Path>) -> PathBuf {
        self.absolute(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.current.clone())
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
