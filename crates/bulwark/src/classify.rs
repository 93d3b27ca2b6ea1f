//! Operating-system error classification.
//!
//! Each supported operating system has a static table mapping raw error
//! codes to a [`Category`]. Codes missing from the table are unrecognized and
//! must reach the caller untouched.

use std::fmt;
use std::path::PathBuf;

use bulwark_platform::OperatingSystem;

/// Actionable class of a recognized OS failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    AccessDenied,
    DeviceFull,
    FileLocked,
    HardwareFault,
    DeviceNotFound,
}

// https://learn.microsoft.com/windows/win32/debug/system-error-codes
const WINDOWS: &[(i32, Category)] = &[
    (5, Category::AccessDenied),
    (112, Category::DeviceFull),
    (433, Category::DeviceNotFound),
    (483, Category::HardwareFault),
    (1224, Category::FileLocked),
];

// include/uapi/asm-generic/errno-base.h
const LINUX: &[(i32, Category)] = &[
    (1, Category::AccessDenied),
    (13, Category::AccessDenied),
    (28, Category::DeviceFull),
];

// bsd/sys/errno.h
const MACOS: &[(i32, Category)] = &[
    (1, Category::AccessDenied),
    (13, Category::AccessDenied),
    (28, Category::DeviceFull),
];

fn table(os: OperatingSystem) -> &'static [(i32, Category)] {
    match os {
        OperatingSystem::Windows => WINDOWS,
        OperatingSystem::Linux => LINUX,
        OperatingSystem::Macos => MACOS,
        OperatingSystem::Other => &[],
    }
}

/// Look up `code` in the table for `os`.
pub fn classify(os: OperatingSystem, code: i32) -> Option<Category> {
    table(os)
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, category)| *category)
}

/// What the caller was trying to do when the primitive failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
    paths:   Vec<PathBuf>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            paths:   Vec::new(),
        }
    }

    /// Path the current user may need to take ownership of.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn message(&self) -> &str { &self.message }

    pub fn paths(&self) -> &[PathBuf] { &self.paths }
}

/// A recognized failure together with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    category: Category,
    message:  String,
}

impl Diagnosis {
    pub fn category(&self) -> Category { self.category }

    pub fn message(&self) -> &str { &self.message }

    pub fn into_message(self) -> String { self.message }

    pub fn is_full(&self) -> bool { self.category == Category::DeviceFull }

    pub fn is_access_denied(&self) -> bool { self.category == Category::AccessDenied }

    pub fn is_locked(&self) -> bool { self.category == Category::FileLocked }

    pub fn is_hardware_fault(&self) -> bool { self.category == Category::HardwareFault }

    pub fn is_device_missing(&self) -> bool { self.category == Category::DeviceNotFound }
}

/// Classify `code` and render the user-facing message for `failure`.
///
/// `error` is the original failure; categories whose remedy depends on the
/// details embed its text.
pub fn diagnose(
    os: OperatingSystem,
    code: i32,
    error: &dyn fmt::Display,
    failure: &Failure,
) -> Option<Diagnosis> {
    let category = classify(os, code)?;
    let mut message = format!("{}. ", failure.message);
    match category {
        Category::AccessDenied => {
            message.push_str(
                "Permission was denied: the tool cannot access the file or directory.\n\
                 Please ensure that it is located somewhere the current user has read/write \
                 permissions for.",
            );
            if os.is_posix() && !failure.paths.is_empty() {
                let paths: Vec<String> = failure
                    .paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                message.push_str(&format!(
                    "\nTry running:\n  sudo chown -R $(whoami) {}",
                    paths.join(" ")
                ));
            }
        }
        Category::DeviceFull => {
            message.push_str(&format!(
                "The target device is full.\n{error}\nFree up space and try again."
            ));
        }
        Category::FileLocked => {
            message.push_str(&format!(
                "The file is being used by another program.\n{error}\n\
                 Close the other program or pause any antivirus scan and try again."
            ));
        }
        Category::HardwareFault => {
            message.push_str(
                "There is a problem with the device driver that this file or directory is \
                 stored on.",
            );
        }
        Category::DeviceNotFound => {
            message.push_str(&format!(
                "The device was not found.\n{error}\nVerify the device is mounted and try again."
            ));
        }
    }
    Some(Diagnosis { category, message })
}
