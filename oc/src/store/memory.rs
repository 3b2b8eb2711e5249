//! In-memory logs for tests and dry runs
//!
//! Handles are cheap clones over shared state, so a test can keep one handle
//! to inspect what the pipeline wrote through the other. Appended entries stay
//! pending until `sync`; only synced entries survive a simulated crash.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CheckpointLog, RecordSink, StoreError};

#[derive(Debug, Default)]
struct Entries<T> {
    durable: Vec<T>,
    pending: Vec<T>,
    fail_writes: bool,
}

impl<T> Entries<T> {
    fn push(&mut self, entry: T) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("injected write failure"));
        }
        self.pending.push(entry);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("injected sync failure"));
        }
        self.durable.append(&mut self.pending);
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Checkpoint log held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpoint {
    inner: Arc<Mutex<Entries<String>>>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with keys that are already durable
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let log = Self::new();
        lock(&log.inner).durable = keys.into_iter().map(Into::into).collect();
        log
    }

    /// Make every later append and sync fail
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.inner).fail_writes = fail;
    }

    /// Durable keys in append order
    pub fn keys(&self) -> Vec<String> {
        lock(&self.inner).durable.clone()
    }

    /// Drop anything appended but not synced
    pub fn crash(&self) {
        lock(&self.inner).pending.clear();
    }
}

impl CheckpointLog for MemoryCheckpoint {
    fn load_keys(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self.keys())
    }

    fn append(&mut self, key: &str) -> Result<(), StoreError> {
        lock(&self.inner).push(key.to_string()).map_err(StoreError::CheckpointWrite)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        lock(&self.inner).sync().map_err(StoreError::CheckpointWrite)
    }
}

/// Output sink held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Entries<(String, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with rows that are already durable
    pub fn with_rows<I, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let sink = Self::new();
        lock(&sink.inner).durable = rows.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        sink
    }

    pub fn fail_writes(&self, fail: bool) {
        lock(&self.inner).fail_writes = fail;
    }

    /// Durable rows in append order
    pub fn rows(&self) -> Vec<(String, String)> {
        lock(&self.inner).durable.clone()
    }

    pub fn crash(&self) {
        lock(&self.inner).pending.clear();
    }
}

impl RecordSink for MemorySink {
    fn existing_keys(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self.rows().into_iter().map(|(k, _)| k).collect())
    }

    fn append(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        lock(&self.inner)
            .push((key.to_string(), text.to_string()))
            .map_err(StoreError::SinkWrite)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        lock(&self.inner).sync().map_err(StoreError::SinkWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_until_sync() {
        let log = MemoryCheckpoint::new();
        let mut writer = log.clone();
        writer.append("a").unwrap();
        assert!(log.keys().is_empty());
        writer.sync().unwrap();
        assert_eq!(log.keys(), vec!["a"]);
    }

    #[test]
    fn test_crash_drops_pending() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.append("a", "x").unwrap();
        sink.crash();
        writer.sync().unwrap();
        assert!(sink.rows().is_empty());
    }

    #[test]
    fn test_injected_failure() {
        let sink = MemorySink::with_rows([("k", "v")]);
        sink.fail_writes(true);
        let mut writer = sink.clone();
        assert!(matches!(writer.append("a", "x"), Err(StoreError::SinkWrite(_))));
        assert_eq!(writer.existing_keys().unwrap(), vec!["k"]);
    }
}
