//! Pipeline - drives records through chunking, correction and commit

use std::collections::HashSet;

use colored::Colorize;
use tracing::{debug, error, info, warn};

use super::{PipelineError, RecordOutcome, RecordState, RunSummary, SkipReason};
use crate::chunker::Chunker;
use crate::domain::Record;
use crate::domain::text::normalize_whitespace;
use crate::oracle::OracleClient;
use crate::progression::ProgressionLogger;
use crate::source::SourceError;
use crate::store::ProgressStore;

/// Run toggles
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Stop after this many source rows
    pub sample_limit: Option<usize>,
    /// Load completed keys from the checkpoint and sink before starting
    pub resume: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sample_limit: None,
            resume: true,
        }
    }
}

/// Sequential correction driver
///
/// Owns the Progress Store for the length of a run. Records are processed
/// one at a time and the chunks of a record in order.
pub struct Pipeline {
    oracle: OracleClient,
    store: ProgressStore,
    chunker: Chunker,
    progression: ProgressionLogger,
    options: PipelineOptions,
    committed_this_run: HashSet<String>,
}

impl Pipeline {
    pub fn new(
        oracle: OracleClient,
        store: ProgressStore,
        chunker: Chunker,
        progression: ProgressionLogger,
        options: PipelineOptions,
    ) -> Self {
        debug!(?options, word_limit = chunker.word_limit(), "Pipeline::new: called");
        Self {
            oracle,
            store,
            chunker,
            progression,
            options,
            committed_this_run: HashSet::new(),
        }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn oracle(&self) -> &OracleClient {
        &self.oracle
    }

    /// Process every record, in order, until the source or sample limit ends
    ///
    /// Returns early only on a store failure or an unreadable source.
    pub async fn run<I>(&mut self, records: I) -> Result<RunSummary, PipelineError>
    where
        I: IntoIterator<Item = Result<Record, SourceError>>,
    {
        debug!("Pipeline::run: called");
        let mut summary = RunSummary::default();

        if self.options.resume {
            let stats = self.store.load()?;
            summary.preloaded = stats.total;
            if stats.total > 0 {
                println!(
                    "Resuming: {} record(s) already complete ({} in checkpoint, {} in output)",
                    stats.total, stats.from_checkpoint, stats.from_sink
                );
            }
        } else {
            info!("Resume disabled, ignoring existing checkpoint and output");
        }

        if let Some(limit) = self.options.sample_limit {
            println!("{}", format!("*** SAMPLE MODE: processing only the first {limit} rows ***").yellow());
        }

        let calls_before = self.oracle.calls();
        for (row, item) in records.into_iter().enumerate() {
            if let Some(limit) = self.options.sample_limit
                && row >= limit
            {
                println!("{}", format!("*** Sample limit reached ({limit} rows) ***").yellow());
                summary.sample_limit_reached = true;
                break;
            }

            let outcome = match item {
                Ok(record) => self.process_record(&record).await?,
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Source read failed");
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, "Skipping malformed row");
                    eprintln!("{} {}", "Skipping malformed row:".yellow(), e);
                    RecordOutcome::Skipped {
                        key: None,
                        reason: SkipReason::Malformed,
                    }
                }
            };
            summary.record(&outcome);
        }

        summary.oracle_calls = self.oracle.calls() - calls_before;
        info!(%summary, "Pipeline::run: finished");
        Ok(summary)
    }

    fn transition(&self, key: &str, from: RecordState, to: RecordState) -> RecordState {
        if !from.can_transition_to(&to) {
            warn!(%key, %from, %to, "Unexpected record state transition");
        }
        debug!(%key, %from, %to, "record state");
        to
    }

    /// Take one record to a terminal state
    async fn process_record(&mut self, record: &Record) -> Result<RecordOutcome, PipelineError> {
        let key = record.key.as_str();
        debug!(%key, "process_record: called");
        let state = RecordState::Pending;

        if record.is_no_data() || record.payload().trim().is_empty() {
            self.transition(key, state, RecordState::Skipped);
            debug!(%key, "No data, skipping");
            return Ok(RecordOutcome::Skipped {
                key: Some(key.to_string()),
                reason: SkipReason::NoData,
            });
        }

        if self.store.is_complete(key) {
            self.transition(key, state, RecordState::Skipped);
            let reason = if self.committed_this_run.contains(key) {
                warn!(%key, "Duplicate key in source, already committed this run");
                SkipReason::Duplicate
            } else {
                SkipReason::AlreadyComplete
            };
            println!("Skipping {key} - already processed");
            return Ok(RecordOutcome::Skipped {
                key: Some(key.to_string()),
                reason,
            });
        }

        let mut state = self.transition(key, state, RecordState::Chunking);
        let chunks = self.chunker.split_record(record);
        let total = chunks.len();
        println!("\nProcessing {} chunk(s) for {}...", total, key.cyan());

        let mut corrected = Vec::with_capacity(total);
        for chunk in &chunks {
            state = self.transition(
                key,
                state,
                RecordState::Correcting {
                    index: chunk.index,
                    total,
                },
            );
            println!("  -> chunk {}/{} ({} words)", chunk.index + 1, total, chunk.word_count());
            self.progression.log_chunk_start(key, chunk.index, total);
            self.progression.log_chunk_before(&chunk.text);

            match self.oracle.correct_chunk(chunk).await {
                Ok(result) => {
                    debug!(%key, index = chunk.index, attempts = result.attempts, "chunk corrected");
                    self.progression.log_chunk_after(&result.corrected_text);
                    corrected.push(result.corrected_text);
                }
                Err(e) => {
                    self.transition(key, state, RecordState::Failed);
                    error!(%key, index = chunk.index, error = %e, "Record abandoned");
                    eprintln!(
                        "{} {}, text starts with: {}",
                        "ERROR OCCURRED for".red(),
                        key,
                        record.snippet()
                    );
                    eprintln!("{} {}", "Cause:".red(), e);
                    self.progression.log_record_failed(key, &e.to_string());
                    return Ok(RecordOutcome::Failed {
                        key: key.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        state = self.transition(key, state, RecordState::Reassembling);
        let final_text = normalize_whitespace(&corrected.join(" "));

        self.store.commit(key, &final_text)?;
        self.transition(key, state, RecordState::Committed);
        self.committed_this_run.insert(key.to_string());
        self.progression.log_record_complete(key);

        let chars = final_text.chars().count();
        info!(%key, chunks = total, chars, "Record committed");
        println!("{} {} ({} chars)", "COMPLETE for".green(), key, chars);

        Ok(RecordOutcome::Committed {
            key: key.to_string(),
            chunks: total,
            chars,
        })
    }
}
