use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::error::{Operation, Result, map_io};
use crate::primitives::Handle;

#[derive(Debug)]
pub struct LocalHandle {
    file: fs::File,
    path: PathBuf,
}

impl LocalHandle {
    pub(crate) fn new(file: fs::File, path: PathBuf) -> Self { Self { file, path } }
}

impl Handle for LocalHandle {
    fn read_into(&mut self, buffer: &mut [u8]) -> Result<usize> {
        map_io(Operation::Read, &self.path, self.file.read(buffer))
    }

    fn write_from(&mut self, buffer: &[u8]) -> Result<()> {
        map_io(Operation::Write, &self.path, self.file.write_all(buffer))
    }

    fn length(&mut self) -> Result<u64> {
        map_io(Operation::Read, &self.path, self.file.metadata()).map(|m| m.len())
    }

    fn flush(&mut self) -> Result<()> { map_io(Operation::Write, &self.path, self.file.flush()) }
}
