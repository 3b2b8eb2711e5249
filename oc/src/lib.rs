//! ocrclean - resumable OCR post-correction
//!
//! Long OCR'd newspaper passages, keyed by date, are split into word-bounded
//! chunks, corrected one chunk at a time by an LLM, reassembled and appended
//! to an output CSV. Progress is checkpointed per record so a multi-hour
//! batch can be stopped and restarted without repeating or duplicating work.
//!
//! # Core Concepts
//!
//! - **Per-record commits**: a record is written whole or not at all
//! - **Dual-source resume**: the checkpoint log and the output both prove completion
//! - **Bounded corrections**: a corrected chunk is never longer than its input
//!
//! # Modules
//!
//! - [`chunker`] - word-bounded chunking
//! - [`oracle`] - correction calls with retry policy and length bound
//! - [`store`] - checkpoint log, output sink and Progress Store
//! - [`progression`] - before/after audit log
//! - [`pipeline`] - the driver tying it together
//! - [`cleaner`] - regex pre-cleaning of raw exports
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod chunker;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod oracle;
pub mod pipeline;
pub mod progression;
pub mod prompts;
pub mod source;
pub mod store;

/// Words per chunk unless configured otherwise
pub const DEFAULT_WORD_LIMIT: usize = 500;

// Re-export commonly used types
pub use chunker::Chunker;
pub use config::{Config, LlmConfig, PathsConfig, PipelineConfig, RunPaths};
pub use domain::{Chunk, CorrectionResult, Record};
pub use llm::{LlmClient, LlmError, OpenAIClient, create_client};
pub use oracle::{LengthBound, LlmOracle, Oracle, OracleClient, OracleError, RetryPolicy, Script, ScriptedOracle};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, RecordOutcome, RecordState, RunSummary, SkipReason};
pub use progression::ProgressionLogger;
pub use source::{CsvSource, SourceError};
pub use store::{CheckpointLog, CsvSink, FileCheckpoint, ProgressStore, RecordSink, StoreError};
