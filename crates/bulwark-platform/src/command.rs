use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

/// Description of a process to launch.
///
/// Unlike `std::process::Command` this is plain data: it can be cloned,
/// inspected, rendered into messages and turned into a std or tokio command
/// as many times as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    program:           OsString,
    args:              Vec<OsString>,
    envs:              Vec<(OsString, OsString)>,
    env_clear:         bool,
    working_directory: Option<PathBuf>,
}

impl ProcessCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program:           program.as_ref().to_owned(),
            args:              Vec::new(),
            envs:              Vec::new(),
            env_clear:         false,
            working_directory: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.envs
            .push((key.as_ref().to_owned(), val.as_ref().to_owned()));
        self
    }

    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self.envs.clear();
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn program(&self) -> &OsStr { &self.program }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> { self.args.iter().map(OsString::as_os_str) }

    pub fn working_directory(&self) -> Option<&Path> { self.working_directory.as_deref() }

    pub fn to_std(&self) -> StdCommand {
        let mut command = StdCommand::new(&self.program);
        command.args(&self.args);
        if self.env_clear {
            command.env_clear();
        }
        command.envs(self.envs.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &self.working_directory {
            command.current_dir(dir);
        }
        command
    }

    pub fn to_tokio(&self) -> tokio::process::Command { tokio::process::Command::from(self.to_std()) }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
