//! CSV record source
//!
//! Reads `(Date, Text)` rows in file order. Columns are located by header
//! name when present, otherwise the first two columns are used. Rows that
//! cannot become a [`Record`] are reported as [`SourceError::Malformed`] and
//! iteration continues; I/O failures are reported as [`SourceError::Read`].

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::debug;

use crate::domain::Record;

/// Header of the key column
pub const KEY_COLUMN: &str = "Date";

/// Header of the text column
pub const TEXT_COLUMN: &str = "Text";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed row at line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("failed to read source: {0}")]
    Read(#[source] csv::Error),
}

impl SourceError {
    /// Malformed rows are skipped; everything else stops the run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SourceError::Malformed { .. })
    }
}

/// Streaming reader over a CSV file of records
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
    key_idx: usize,
    text_idx: usize,
}

impl CsvSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "CsvSource::open: called");
        let reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| SourceError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader)
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(rdr: R) -> Result<Self, SourceError> {
        Self::from_csv(ReaderBuilder::new().flexible(true).from_reader(rdr))
    }

    fn from_csv(mut reader: csv::Reader<R>) -> Result<Self, SourceError> {
        let headers = reader.headers().map_err(SourceError::Read)?.clone();
        let key_idx = column_index(&headers, KEY_COLUMN).unwrap_or(0);
        let text_idx = column_index(&headers, TEXT_COLUMN).unwrap_or(1);
        debug!(?headers, key_idx, text_idx, "CsvSource: resolved columns");
        Ok(Self {
            reader,
            key_idx,
            text_idx,
        })
    }

    /// Rows in file order, header excluded
    pub fn records(self) -> impl Iterator<Item = Result<Record, SourceError>> {
        let Self {
            reader,
            key_idx,
            text_idx,
        } = self;
        reader
            .into_records()
            .map(move |row| to_record(row, key_idx, text_idx))
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn to_record(row: Result<StringRecord, csv::Error>, key_idx: usize, text_idx: usize) -> Result<Record, SourceError> {
    let row = match row {
        Ok(row) => row,
        Err(e) if e.is_io_error() => return Err(SourceError::Read(e)),
        Err(e) => {
            let line = e.position().map(|p| p.line()).unwrap_or_default();
            return Err(SourceError::Malformed {
                line,
                reason: e.to_string(),
            });
        }
    };

    let line = row.position().map(|p| p.line()).unwrap_or_default();
    let (Some(key), Some(text)) = (row.get(key_idx), row.get(text_idx)) else {
        return Err(SourceError::Malformed {
            line,
            reason: format!("expected at least {} fields, found {}", key_idx.max(text_idx) + 1, row.len()),
        });
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(SourceError::Malformed {
            line,
            reason: "empty key".to_string(),
        });
    }

    Ok(Record::new(key, text))
}
