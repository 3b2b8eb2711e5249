//! Progression log - human-readable before/after audit trail
//!
//! The file is truncated at the start of every run and then only appended
//! to. Nothing reads it back. Write failures are reported with `warn!` and
//! never stop the pipeline.
//!
//! ```text
//! OCR CORRECTION PROGRESSION
//! ============================================================
//! RUN: <run-id> <timestamp>
//!
//! ============================================================
//! DATE: 1880-01-01
//! CHUNKS: 2
//! ============================================================
//!
//! [CHUNK 1/2 - BEFORE]
//! ...
//! [CHUNK 1/2 - AFTER]
//! ...
//! COMPLETE for 1880-01-01
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

const TITLE: &str = "OCR CORRECTION PROGRESSION";
const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Append-only progression writer
pub struct ProgressionLogger {
    writer: Option<Box<dyn Write + Send>>,
    /// (index, total) of the chunk being logged
    current: Option<(usize, usize)>,
}

impl ProgressionLogger {
    /// Truncate `path` and write the run banner
    pub fn create(path: impl AsRef<Path>, run_id: &str, started: DateTime<Utc>) -> io::Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), %run_id, "ProgressionLogger::create: called");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut logger = Self::from_writer(Box::new(BufWriter::new(file)));
        logger.try_write(&format!(
            "{TITLE}\n{}\nRUN: {run_id} {}\n\n",
            rule(),
            started.to_rfc3339()
        ))?;
        Ok(logger)
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Some(writer),
            current: None,
        }
    }

    /// A logger that drops everything
    pub fn disabled() -> Self {
        Self {
            writer: None,
            current: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    fn try_write(&mut self, text: &str) -> io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
        }
        Ok(())
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.try_write(text) {
            warn!(error = %e, "ProgressionLogger: write failed");
        }
    }

    /// Begin chunk `index` (0-based) of `total`; the first chunk opens the
    /// record section
    pub fn log_chunk_start(&mut self, record_key: &str, index: usize, total: usize) {
        debug!(%record_key, index, total, "log_chunk_start: called");
        if index == 0 {
            let rule = rule();
            self.write(&format!("\n{rule}\nDATE: {record_key}\nCHUNKS: {total}\n{rule}\n\n"));
        }
        self.current = Some((index, total));
    }

    pub fn log_chunk_before(&mut self, text: &str) {
        let label = self.label();
        self.write(&format!("[CHUNK {label} - BEFORE]\n{text}\n\n"));
    }

    pub fn log_chunk_after(&mut self, text: &str) {
        let label = self.label();
        self.write(&format!("[CHUNK {label} - AFTER]\n{text}\n\n"));
    }

    pub fn log_record_complete(&mut self, record_key: &str) {
        self.current = None;
        self.write(&format!("COMPLETE for {record_key}\n\n"));
    }

    pub fn log_record_failed(&mut self, record_key: &str, reason: &str) {
        self.current = None;
        self.write(&format!("FAILED for {record_key}: {reason}\n\n"));
    }

    fn label(&self) -> String {
        match self.current {
            Some((index, total)) => format!("{}/{}", index + 1, total),
            None => "?/?".to_string(),
        }
    }
}
