//! Completion tracking over the sink and checkpoint log

use std::collections::HashSet;

use tracing::{debug, info};

use super::{CheckpointLog, RecordSink, StoreError};

/// Keys known to be complete
#[derive(Debug, Default, Clone)]
pub struct ProgressSet {
    keys: HashSet<String>,
}

impl ProgressSet {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns false if the key was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// What [`ProgressStore::load`] found
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub from_checkpoint: usize,
    pub from_sink: usize,
    /// Distinct keys across both logs
    pub total: usize,
}

/// Owns both durable logs and the in-memory [`ProgressSet`]
pub struct ProgressStore {
    checkpoint: Box<dyn CheckpointLog>,
    sink: Box<dyn RecordSink>,
    completed: ProgressSet,
}

impl ProgressStore {
    pub fn new(checkpoint: Box<dyn CheckpointLog>, sink: Box<dyn RecordSink>) -> Self {
        Self {
            checkpoint,
            sink,
            completed: ProgressSet::default(),
        }
    }

    /// Rebuild the completed set from both logs
    pub fn load(&mut self) -> Result<LoadStats, StoreError> {
        debug!("ProgressStore::load: called");
        let checkpoint_keys = self.checkpoint.load_keys()?;
        let sink_keys = self.sink.existing_keys()?;

        let stats = LoadStats {
            from_checkpoint: checkpoint_keys.len(),
            from_sink: sink_keys.len(),
            total: 0,
        };
        for key in checkpoint_keys.into_iter().chain(sink_keys) {
            self.completed.insert(key);
        }
        let stats = LoadStats {
            total: self.completed.len(),
            ..stats
        };
        info!(
            checkpoint = stats.from_checkpoint,
            sink = stats.from_sink,
            total = stats.total,
            "Loaded progress"
        );
        Ok(stats)
    }

    pub fn is_complete(&self, key: &str) -> bool {
        self.completed.contains(key)
    }

    pub fn completed(&self) -> &ProgressSet {
        &self.completed
    }

    /// Durably record a key as complete without writing output
    pub fn mark_complete(&mut self, key: &str) -> Result<(), StoreError> {
        debug!(%key, "mark_complete: called");
        self.checkpoint.append(key)?;
        self.checkpoint.sync()?;
        self.completed.insert(key);
        Ok(())
    }

    /// Write the output row, then the checkpoint, then the in-memory set
    ///
    /// A crash between the two writes leaves the row in the sink with no
    /// checkpoint entry; `load` still sees it as complete.
    pub fn commit(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        debug!(%key, len = text.len(), "commit: called");
        self.sink.append(key, text)?;
        self.sink.sync()?;
        self.mark_complete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCheckpoint, MemorySink};

    fn store(checkpoint: &MemoryCheckpoint, sink: &MemorySink) -> ProgressStore {
        ProgressStore::new(Box::new(checkpoint.clone()), Box::new(sink.clone()))
    }

    #[test]
    fn test_load_unions_both_logs() {
        let checkpoint = MemoryCheckpoint::with_keys(["a", "b"]);
        let sink = MemorySink::with_rows([("b", "x"), ("c", "y")]);
        let mut store = store(&checkpoint, &sink);

        let stats = store.load().unwrap();
        assert_eq!(
            stats,
            LoadStats {
                from_checkpoint: 2,
                from_sink: 2,
                total: 3
            }
        );
        assert!(store.is_complete("a"));
        assert!(store.is_complete("c"));
        assert!(!store.is_complete("d"));
    }

    #[test]
    fn test_commit_writes_both_logs() {
        let checkpoint = MemoryCheckpoint::new();
        let sink = MemorySink::new();
        let mut store = store(&checkpoint, &sink);

        store.commit("k", "text").unwrap();
        assert!(store.is_complete("k"));
        assert_eq!(sink.rows(), vec![("k".to_string(), "text".to_string())]);
        assert_eq!(checkpoint.keys(), vec!["k"]);
    }

    #[test]
    fn test_sink_failure_leaves_key_incomplete() {
        let checkpoint = MemoryCheckpoint::new();
        let sink = MemorySink::new();
        sink.fail_writes(true);
        let mut store = store(&checkpoint, &sink);

        assert!(matches!(store.commit("k", "t"), Err(StoreError::SinkWrite(_))));
        assert!(!store.is_complete("k"));
        assert!(checkpoint.keys().is_empty());
    }

    #[test]
    fn test_checkpoint_failure_after_sink_is_recovered_on_load() {
        let checkpoint = MemoryCheckpoint::new();
        let sink = MemorySink::new();
        checkpoint.fail_writes(true);
        let mut first = store(&checkpoint, &sink);

        assert!(matches!(first.commit("k", "t"), Err(StoreError::CheckpointWrite(_))));
        assert!(!first.is_complete("k"));
        assert_eq!(sink.rows().len(), 1);

        checkpoint.fail_writes(false);
        let mut second = store(&checkpoint, &sink);
        second.load().unwrap();
        assert!(second.is_complete("k"));
    }
}
