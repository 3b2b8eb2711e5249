//! Output sink - fully quoted `(Date, Text)` CSV, append only

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Writer, WriterBuilder};
use tracing::{debug, warn};

use super::StoreError;
use super::checkpoint::ends_without_newline;
use crate::source::KEY_COLUMN;

/// Header row of the output file
pub const OUTPUT_HEADER: [&str; 2] = ["Date", "Text"];

/// Append-only destination for corrected records
pub trait RecordSink: Send {
    /// Keys of rows already present
    fn existing_keys(&mut self) -> Result<Vec<String>, StoreError>;

    fn append(&mut self, key: &str, text: &str) -> Result<(), StoreError>;

    /// Flush buffered rows to durable storage
    fn sync(&mut self) -> Result<(), StoreError>;
}

/// CSV file sink
///
/// The file is opened on the first append. The header is written only when
/// the file is new or empty. A last row without its terminating newline was
/// never committed: it is not reported by `existing_keys` and is cut off
/// before the next append.
pub struct CsvSink {
    path: PathBuf,
    writer: Option<Writer<File>>,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "CsvSink::new: called");
        Self { path, writer: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut Writer<File>, StoreError> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open_writer()?,
        };
        Ok(self.writer.insert(writer))
    }

    fn open_writer(&self) -> Result<Writer<File>, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::SinkWrite)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(StoreError::SinkWrite)?;

        let mut len = file.metadata().map_err(StoreError::SinkWrite)?.len();
        if ends_without_newline(&mut file).map_err(StoreError::SinkWrite)? {
            let scan = scan(&self.path)?;
            warn!(
                path = %self.path.display(),
                len,
                intact = scan.intact_len,
                "Output ends mid-row, truncating the partial row"
            );
            file.set_len(scan.intact_len).map_err(StoreError::SinkWrite)?;
            file.sync_data().map_err(StoreError::SinkWrite)?;
            len = scan.intact_len;
        }

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .has_headers(false)
            .from_writer(file);

        if len == 0 {
            debug!(path = %self.path.display(), "CsvSink: new file, writing header");
            writer.write_record(OUTPUT_HEADER).map_err(csv_to_write)?;
            writer.flush().map_err(StoreError::SinkWrite)?;
        }
        Ok(writer)
    }
}

/// What an existing output file holds
struct Scan {
    /// Keys of complete rows, in file order
    keys: Vec<String>,
    /// Byte length up to the end of the last complete row
    intact_len: u64,
}

/// Read every row of the output file. Only the last row can be torn: it is
/// torn when the file does not end in a newline.
fn scan(path: &Path) -> Result<Scan, StoreError> {
    let read_err = |e: csv::Error| StoreError::SinkRead(io::Error::from(e));

    let mut file = File::open(path).map_err(StoreError::SinkRead)?;
    let file_len = file.metadata().map_err(StoreError::SinkRead)?.len();
    let torn = ends_without_newline(&mut file).map_err(StoreError::SinkRead)?;
    file.seek(SeekFrom::Start(0)).map_err(StoreError::SinkRead)?;

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
    let key_idx = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(KEY_COLUMN))
        .unwrap_or(0);

    // (start offset, key) per data row
    let mut rows: Vec<(u64, Option<String>)> = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let start = reader.position().byte();
        match reader.read_record(&mut record) {
            Ok(true) => {
                let key = record
                    .get(key_idx)
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string);
                rows.push((start, key));
            }
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(read_err(e)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable output row");
                rows.push((start, None));
            }
        }
    }

    let intact_len = if torn {
        // A torn header leaves nothing worth keeping
        let start = rows.pop().map_or(0, |(start, _)| start);
        warn!(path = %path.display(), offset = start, "Ignoring partial last output row");
        start
    } else {
        file_len
    };

    let keys = rows.into_iter().filter_map(|(_, key)| key).collect();
    Ok(Scan { keys, intact_len })
}

fn csv_to_write(e: csv::Error) -> StoreError {
    StoreError::SinkWrite(io::Error::from(e))
}

impl RecordSink for CsvSink {
    fn existing_keys(&mut self) -> Result<Vec<String>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "existing_keys: no output yet");
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StoreError::SinkRead(io::Error::from(e)))?;
        let key_idx = reader
            .headers()
            .map_err(|e| StoreError::SinkRead(io::Error::from(e)))?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(KEY_COLUMN))
            .unwrap_or(0);

        let mut keys = Vec::new();
        for row in reader.records() {
            match row {
                Ok(row) => {
                    if let Some(key) = row.get(key_idx).map(str::trim).filter(|k| !k.is_empty()) {
                        keys.push(key.to_string());
                    }
                }
                Err(e) if e.is_io_error() => return Err(StoreError::SinkRead(io::Error::from(e))),
                Err(e) => warn!(path = %self.path.display(), error = %e, "Skipping unreadable output row"),
            }
        }
        debug!(count = keys.len(), "existing_keys: scanned");
        Ok(keys)
    }

    fn append(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        self.writer()?.write_record([key, text]).map_err(csv_to_write)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(StoreError::SinkWrite)?;
            writer.get_ref().sync_data().map_err(StoreError::SinkWrite)?;
        }
        Ok(())
    }
}
