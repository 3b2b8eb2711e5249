//! Checkpoint log - newline-delimited completed keys

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::StoreError;

/// Append-only list of completed record keys
pub trait CheckpointLog: Send {
    /// Every key written so far, in append order
    fn load_keys(&mut self) -> Result<Vec<String>, StoreError>;

    /// Append one key; durable only after [`CheckpointLog::sync`]
    fn append(&mut self, key: &str) -> Result<(), StoreError>;

    /// Flush buffered appends to durable storage
    fn sync(&mut self) -> Result<(), StoreError>;
}

/// Checkpoint log backed by a text file
pub struct FileCheckpoint {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileCheckpoint {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "FileCheckpoint::new: called");
        Self { path, writer: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, StoreError> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open_writer()?,
        };
        Ok(self.writer.insert(writer))
    }

    fn open_writer(&self) -> Result<BufWriter<File>, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::CheckpointWrite)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(StoreError::CheckpointWrite)?;
        if ends_without_newline(&mut file).map_err(StoreError::CheckpointWrite)? {
            warn!(path = %self.path.display(), "Checkpoint log ends mid-line, terminating it");
            file.write_all(b"\n").map_err(StoreError::CheckpointWrite)?;
        }
        Ok(BufWriter::new(file))
    }
}

/// True when the file is non-empty and its last byte is not `\n`
pub(super) fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl CheckpointLog for FileCheckpoint {
    fn load_keys(&mut self) -> Result<Vec<String>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "load_keys: no checkpoint yet");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(StoreError::CheckpointRead)?;
        let keys: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        debug!(count = keys.len(), "load_keys: loaded");
        Ok(keys)
    }

    fn append(&mut self, key: &str) -> Result<(), StoreError> {
        let writer = self.writer()?;
        writeln!(writer, "{}", key).map_err(StoreError::CheckpointWrite)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(StoreError::CheckpointWrite)?;
            writer.get_ref().sync_data().map_err(StoreError::CheckpointWrite)?;
        }
        Ok(())
    }
}
