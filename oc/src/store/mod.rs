//! Durable progress tracking
//!
//! Two append-only logs record finished work: the output sink (one row per
//! committed record) and the checkpoint log (one key per line). Either is
//! enough to prove a record complete, so [`ProgressStore::load`] unions
//! both, and [`ProgressStore::commit`] always writes the sink first.
//!
//! ```text
//! commit(key, text)
//!   sink.append(key, text); sink.sync()
//!   checkpoint.append(key); checkpoint.sync()
//!   completed.insert(key)
//! ```

mod checkpoint;
mod error;
mod memory;
mod progress;
mod sink;

pub use checkpoint::{CheckpointLog, FileCheckpoint};
pub use error::StoreError;
pub use memory::{MemoryCheckpoint, MemorySink};
pub use progress::{LoadStats, ProgressSet, ProgressStore};
pub use sink::{CsvSink, OUTPUT_HEADER, RecordSink};
