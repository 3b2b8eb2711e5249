//! Run summary

use std::fmt;

use serde::Serialize;

use super::{RecordOutcome, SkipReason};

/// Counts for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Keys already complete when the run started
    pub preloaded: usize,
    pub committed: usize,
    pub already_complete: usize,
    pub duplicates: usize,
    pub no_data: usize,
    pub malformed: usize,
    pub failed: usize,
    pub oracle_calls: u64,
    /// Stopped early because of the sample limit
    pub sample_limit_reached: bool,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Committed { .. } => self.committed += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
            RecordOutcome::Skipped { reason, .. } => match reason {
                SkipReason::AlreadyComplete => self.already_complete += 1,
                SkipReason::Duplicate => self.duplicates += 1,
                SkipReason::NoData => self.no_data += 1,
                SkipReason::Malformed => self.malformed += 1,
            },
        }
    }

    pub fn skipped(&self) -> usize {
        self.already_complete + self.duplicates + self.no_data + self.malformed
    }

    /// Rows that reached a terminal state
    pub fn processed(&self) -> usize {
        self.committed + self.failed + self.skipped()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "committed {}, failed {}, skipped {} (already complete {}, duplicate {}, no data {}, malformed {}), oracle calls {}",
            self.committed,
            self.failed,
            self.skipped(),
            self.already_complete,
            self.duplicates,
            self.no_data,
            self.malformed,
            self.oracle_calls
        )
    }
}
