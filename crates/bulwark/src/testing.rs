//! In-memory doubles for the primitive contracts, with failure injection.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bulwark_fs::{Directory, Entity, Error, File, FileSystem, Handle, OpenMode, Operation, PathContext, Result};
use bulwark_platform::{OperatingSystem, ProcessCommand, ProcessError, ProcessManager, Signal};

use crate::context::{Decoration, DecorationOptions};
use crate::file_system::DecoratedFileSystem;
use crate::policy::ExitPolicy;
use crate::report::{Event, NullReporter, Reporter};

/// A decoration with a private policy, a silent reporter and "Tool" as the
/// tool name.
pub(crate) fn decoration(os: OperatingSystem) -> Decoration {
    Decoration::new()
        .operating_system(os)
        .policy(Arc::new(ExitPolicy::new()))
        .reporter(Arc::new(NullReporter))
        .options(DecorationOptions::new().tool_name("Tool"))
}

pub(crate) fn decorate(os: OperatingSystem) -> (MockFileSystem, DecoratedFileSystem<MockFileSystem>) {
    let mock = MockFileSystem::new();
    (mock.clone(), decoration(os).file_system(mock))
}

pub(crate) fn decorate_with(
    os: OperatingSystem,
    policy: Arc<ExitPolicy>,
) -> (MockFileSystem, DecoratedFileSystem<MockFileSystem>) {
    let mock = MockFileSystem::new();
    (mock.clone(), decoration(os).policy(policy).file_system(mock))
}

#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<Event> { self.events.lock().unwrap().clone() }
}

impl Reporter for RecordingReporter {
    fn send(&self, event: Event) { self.events.lock().unwrap().push(event); }
}

#[derive(Clone, Copy)]
struct Injected {
    code:   i32,
    vanish: bool,
}

struct State {
    current:             PathBuf,
    files:               BTreeMap<PathBuf, Vec<u8>>,
    directories:         BTreeSet<PathBuf>,
    failures:            HashMap<(PathBuf, Operation), Injected>,
    deleted:             Vec<PathBuf>,
    created_files:       usize,
    created_directories: usize,
    temp_counter:        usize,
}

impl State {
    fn add_directory(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                self.directories.insert(ancestor.to_path_buf());
            }
        }
    }

    fn add_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.add_directory(parent);
        }
    }

    fn remove_tree(&mut self, root: &Path) {
        self.files.retain(|path, _| !path.starts_with(root));
        self.directories.retain(|path| !path.starts_with(root));
    }
}

fn not_found() -> io::Error { io::Error::from(io::ErrorKind::NotFound) }

/// A file system held in memory.
///
/// [`MockFileSystem::fail`] makes every later call of one operation on one
/// path fail with a raw OS code.
#[derive(Clone)]
pub(crate) struct MockFileSystem {
    state: Arc<Mutex<State>>,
}

impl MockFileSystem {
    pub(crate) fn new() -> Self {
        let mut state = State {
            current:             PathBuf::from("/cwd"),
            files:               BTreeMap::new(),
            directories:         BTreeSet::new(),
            failures:            HashMap::new(),
            deleted:             Vec::new(),
            created_files:       0,
            created_directories: 0,
            temp_counter:        0,
        };
        state.add_directory(Path::new("/cwd"));
        state.add_directory(Path::new("/tmp"));
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> { self.state.lock().unwrap() }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.has_root() {
            path.to_path_buf()
        } else {
            self.lock().current.join(path)
        }
    }

    pub(crate) fn fail(&self, path: impl AsRef<Path>, operation: Operation, code: i32) {
        let path = self.resolve(path.as_ref());
        self.lock()
            .failures
            .insert((path, operation), Injected { code, vanish: false });
    }

    /// Make the next delete remove the entity and still report `code`.
    pub(crate) fn vanish_on_delete(&self, path: impl AsRef<Path>, code: i32) {
        let path = self.resolve(path.as_ref());
        self.lock()
            .failures
            .insert((path, Operation::Delete), Injected { code, vanish: true });
    }

    pub(crate) fn put_file(&self, path: impl AsRef<Path>, contents: &[u8]) {
        let path = self.resolve(path.as_ref());
        let mut state = self.lock();
        state.add_parent(&path);
        state.files.insert(path, contents.to_vec());
    }

    pub(crate) fn put_directory(&self, path: impl AsRef<Path>) {
        let path = self.resolve(path.as_ref());
        self.lock().add_directory(&path);
    }

    pub(crate) fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = self.resolve(path.as_ref());
        self.lock().files.get(&path).cloned()
    }

    pub(crate) fn deleted(&self) -> Vec<PathBuf> { self.lock().deleted.clone() }

    pub(crate) fn created_files(&self) -> usize { self.lock().created_files }

    pub(crate) fn created_directories(&self) -> usize { self.lock().created_directories }

    fn check(&self, path: &Path, operation: Operation) -> Result<()> {
        let mut state = self.lock();
        let Some(injected) = state.failures.get(&(path.to_path_buf(), operation)).copied() else {
            return Ok(());
        };
        if injected.vanish {
            state.failures.remove(&(path.to_path_buf(), operation));
            state.remove_tree(path);
        }
        Err(Error::io(operation, path, io::Error::from_raw_os_error(injected.code)))
    }
}

impl fmt::Display for MockFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("MockFileSystem") }
}

impl FileSystem for MockFileSystem {
    type File = MockFile;
    type Directory = MockDirectory;

    fn file(&self, path: impl AsRef<Path>) -> MockFile {
        let path = self.resolve(path.as_ref());
        self.lock().created_files += 1;
        MockFile { fs: self.clone(), path }
    }

    fn directory(&self, path: impl AsRef<Path>) -> MockDirectory {
        let path = self.resolve(path.as_ref());
        self.lock().created_directories += 1;
        MockDirectory { fs: self.clone(), path }
    }

    fn current_directory(&self) -> MockDirectory {
        let path = self.lock().current.clone();
        MockDirectory { fs: self.clone(), path }
    }

    fn set_current_directory(&self, path: &Path) -> Result<()> {
        let path = self.resolve(path);
        self.check(&path, Operation::SetCurrentDirectory)?;
        self.lock().current = path;
        Ok(())
    }

    fn system_temp_directory(&self) -> MockDirectory {
        MockDirectory {
            fs:   self.clone(),
            path: PathBuf::from("/tmp"),
        }
    }

    fn path_context(&self) -> Arc<PathContext> { Arc::new(PathContext::new(self.lock().current.clone())) }
}

#[derive(Clone)]
pub(crate) struct MockFile {
    fs:   MockFileSystem,
    path: PathBuf,
}

impl fmt::Display for MockFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockFile: '{}'", self.path.display())
    }
}

impl Entity for MockFile {
    fn path(&self) -> &Path { &self.path }

    fn exists_sync(&self) -> Result<bool> {
        self.fs.check(&self.path, Operation::Exists)?;
        Ok(self.fs.lock().files.contains_key(&self.path))
    }

    fn delete_sync(&self, recursive: bool) -> Result<()> {
        self.fs.check(&self.path, Operation::Delete)?;
        let mut state = self.fs.lock();
        if state.files.remove(&self.path).is_some() {
            state.deleted.push(self.path.clone());
            return Ok(());
        }
        if recursive && state.directories.contains(&self.path) {
            state.remove_tree(&self.path);
            state.deleted.push(self.path.clone());
            return Ok(());
        }
        Err(Error::io(Operation::Delete, &self.path, not_found()))
    }
}

#[async_trait]
impl File for MockFile {
    type Handle = MockHandle;

    async fn exists(&self) -> Result<bool> { self.exists_sync() }

    fn create_sync(&self, recursive: bool) -> Result<()> {
        self.fs.check(&self.path, Operation::Create)?;
        let mut state = self.fs.lock();
        if recursive {
            state.add_parent(&self.path);
        }
        state.files.entry(self.path.clone()).or_default();
        Ok(())
    }

    async fn create(&self, recursive: bool) -> Result<()> { self.create_sync(recursive) }

    async fn delete(&self, recursive: bool) -> Result<()> { self.delete_sync(recursive) }

    fn read_bytes_sync(&self) -> Result<Vec<u8>> {
        self.fs.check(&self.path, Operation::Read)?;
        self.fs
            .lock()
            .files
            .get(&self.path)
            .cloned()
            .ok_or_else(|| Error::io(Operation::Read, &self.path, not_found()))
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> { self.read_bytes_sync() }

    fn read_string_sync(&self) -> Result<String> {
        let bytes = self.read_bytes_sync()?;
        String::from_utf8(bytes)
            .map_err(|e| Error::io(Operation::Read, &self.path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    async fn read_string(&self) -> Result<String> { self.read_string_sync() }

    fn write_bytes_sync(&self, bytes: &[u8]) -> Result<()> {
        self.fs.check(&self.path, Operation::Write)?;
        self.fs.lock().files.insert(self.path.clone(), bytes.to_vec());
        Ok(())
    }

    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> { self.write_bytes_sync(bytes) }

    fn write_string_sync(&self, contents: &str) -> Result<()> { self.write_bytes_sync(contents.as_bytes()) }

    async fn write_string(&self, contents: &str) -> Result<()> { self.write_string_sync(contents) }

    fn open_sync(&self, mode: OpenMode) -> Result<MockHandle> {
        self.fs.check(&self.path, Operation::Open)?;
        let mut state = self.fs.lock();
        match mode {
            OpenMode::Read if !state.files.contains_key(&self.path) => {
                return Err(Error::io(Operation::Open, &self.path, not_found()));
            }
            OpenMode::Read => {}
            OpenMode::Write => {
                state.files.insert(self.path.clone(), Vec::new());
            }
            OpenMode::Append => {
                state.files.entry(self.path.clone()).or_default();
            }
        }
        Ok(MockHandle {
            fs:       self.fs.clone(),
            path:     self.path.clone(),
            position: 0,
        })
    }

    async fn open(&self, mode: OpenMode) -> Result<MockHandle> { self.open_sync(mode) }

    fn copy_sync(&self, new_path: &Path) -> Result<Self> {
        self.fs.check(&self.path, Operation::Copy)?;
        let target = self.fs.resolve(new_path);
        let mut state = self.fs.lock();
        let contents = state
            .files
            .get(&self.path)
            .cloned()
            .ok_or_else(|| Error::io(Operation::Copy, &self.path, not_found()))?;
        state.files.insert(target.clone(), contents);
        Ok(Self {
            fs:   self.fs.clone(),
            path: target,
        })
    }

    async fn copy(&self, new_path: &Path) -> Result<Self> { self.copy_sync(new_path) }
}

pub(crate) struct MockHandle {
    fs:       MockFileSystem,
    path:     PathBuf,
    position: usize,
}

impl Handle for MockHandle {
    fn read_into(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.fs.check(&self.path, Operation::Read)?;
        let state = self.fs.lock();
        let data = state
            .files
            .get(&self.path)
            .ok_or_else(|| Error::io(Operation::Read, &self.path, not_found()))?;
        let remaining = data.get(self.position..).unwrap_or_default();
        let count = remaining.len().min(buffer.len());
        buffer[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }

    fn write_from(&mut self, buffer: &[u8]) -> Result<()> {
        self.fs.check(&self.path, Operation::Write)?;
        self.fs
            .lock()
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buffer);
        Ok(())
    }

    fn length(&mut self) -> Result<u64> {
        self.fs.check(&self.path, Operation::Read)?;
        let state = self.fs.lock();
        let len = state.files.get(&self.path).map_or(0, Vec::len);
        Ok(len as u64)
    }

    fn flush(&mut self) -> Result<()> { self.fs.check(&self.path, Operation::Write) }
}

#[derive(Clone)]
pub(crate) struct MockDirectory {
    fs:   MockFileSystem,
    path: PathBuf,
}

impl fmt::Display for MockDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockDirectory: '{}'", self.path.display())
    }
}

impl Entity for MockDirectory {
    fn path(&self) -> &Path { &self.path }

    fn exists_sync(&self) -> Result<bool> {
        self.fs.check(&self.path, Operation::Exists)?;
        Ok(self.fs.lock().directories.contains(&self.path))
    }

    fn delete_sync(&self, recursive: bool) -> Result<()> {
        self.fs.check(&self.path, Operation::Delete)?;
        let mut state = self.fs.lock();
        if !state.directories.contains(&self.path) {
            return Err(Error::io(Operation::Delete, &self.path, not_found()));
        }
        let has_children = state
            .files
            .keys()
            .chain(state.directories.iter())
            .any(|p| p != &self.path && p.starts_with(&self.path));
        if has_children && !recursive {
            return Err(Error::io(
                Operation::Delete,
                &self.path,
                io::Error::from(io::ErrorKind::DirectoryNotEmpty),
            ));
        }
        state.remove_tree(&self.path);
        state.deleted.push(self.path.clone());
        Ok(())
    }
}

#[async_trait]
impl Directory for MockDirectory {
    type File = MockFile;

    async fn exists(&self) -> Result<bool> { self.exists_sync() }

    fn create_sync(&self, recursive: bool) -> Result<()> {
        self.fs.check(&self.path, Operation::Create)?;
        let mut state = self.fs.lock();
        if recursive {
            state.add_directory(&self.path);
        } else {
            state.directories.insert(self.path.clone());
        }
        Ok(())
    }

    async fn create(&self, recursive: bool) -> Result<()> { self.create_sync(recursive) }

    async fn delete(&self, recursive: bool) -> Result<()> { self.delete_sync(recursive) }

    fn create_temp_sync(&self, prefix: &str) -> Result<Self> {
        self.fs.check(&self.path, Operation::CreateTemp)?;
        let mut state = self.fs.lock();
        let path = self.path.join(format!("{prefix}{}", state.temp_counter));
        state.temp_counter += 1;
        state.directories.insert(path.clone());
        Ok(Self {
            fs: self.fs.clone(),
            path,
        })
    }

    async fn create_temp(&self, prefix: &str) -> Result<Self> { self.create_temp_sync(prefix) }

    fn list_sync(&self) -> Result<Vec<PathBuf>> {
        self.fs.check(&self.path, Operation::List)?;
        let state = self.fs.lock();
        let children: BTreeSet<PathBuf> = state
            .files
            .keys()
            .chain(state.directories.iter())
            .filter(|p| p.parent() == Some(self.path.as_path()))
            .cloned()
            .collect();
        Ok(children.into_iter().collect())
    }

    async fn list(&self) -> Result<Vec<PathBuf>> { self.list_sync() }

    fn child_file(&self, name: &str) -> MockFile {
        MockFile {
            fs:   self.fs.clone(),
            path: self.path.join(name),
        }
    }

    fn child_directory(&self, name: &str) -> Self {
        Self {
            fs:   self.fs.clone(),
            path: self.path.join(name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ProcessCall {
    CanRun,
    Kill,
    Start,
    Run,
    RunSync,
}

/// Process manager that never launches anything unless `start` succeeds.
#[derive(Clone, Default)]
pub(crate) struct MockProcessManager {
    failures: Arc<Mutex<HashMap<ProcessCall, i32>>>,
}

impl MockProcessManager {
    pub(crate) fn fail(&self, call: ProcessCall, code: i32) { self.failures.lock().unwrap().insert(call, code); }

    fn injected(&self, call: ProcessCall) -> Option<io::Error> {
        self.failures
            .lock()
            .unwrap()
            .get(&call)
            .map(|code| io::Error::from_raw_os_error(*code))
    }

    fn finished() -> Output {
        Output {
            status: ExitStatus::default(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }
}

#[async_trait]
impl ProcessManager for MockProcessManager {
    fn can_run(&self, executable: &Path, _working_directory: Option<&Path>) -> bulwark_platform::Result<bool> {
        match self.injected(ProcessCall::CanRun) {
            Some(e) => Err(ProcessError::launch(executable.display().to_string(), e)),
            None => Ok(true),
        }
    }

    fn kill_pid(&self, pid: u32, _signal: Signal) -> bulwark_platform::Result<bool> {
        match self.injected(ProcessCall::Kill) {
            Some(source) => Err(ProcessError::Signal { pid, source }),
            None => Ok(true),
        }
    }

    async fn start(&self, command: &ProcessCommand) -> bulwark_platform::Result<tokio::process::Child> {
        if let Some(e) = self.injected(ProcessCall::Start) {
            return Err(ProcessError::launch(command.to_string(), e));
        }
        command
            .to_tokio()
            .spawn()
            .map_err(|e| ProcessError::launch(command.to_string(), e))
    }

    async fn run(&self, command: &ProcessCommand) -> bulwark_platform::Result<Output> {
        match self.injected(ProcessCall::Run) {
            Some(e) => Err(ProcessError::launch(command.to_string(), e)),
            None => Ok(Self::finished()),
        }
    }

    fn run_sync(&self, command: &ProcessCommand) -> bulwark_platform::Result<Output> {
        match self.injected(ProcessCall::RunSync) {
            Some(e) => Err(ProcessError::launch(command.to_string(), e)),
            None => Ok(Self::finished()),
        }
    }
}
