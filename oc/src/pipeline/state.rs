//! Per-record state machine and outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a record is in its trip through the pipeline
///
/// ```text
/// Pending -> Chunking -> Correcting(i/n) -> Reassembling -> Committed
///    |                        |
///    +-> Skipped              +-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    Pending,
    Chunking,
    Correcting { index: usize, total: usize },
    Reassembling,
    Committed,
    Skipped,
    Failed,
}

impl RecordState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: &RecordState) -> bool {
        use RecordState::*;
        match (self, next) {
            (Pending, Chunking | Skipped) => true,
            (Chunking, Correcting { index: 0, .. }) => true,
            (Correcting { index, total }, Correcting { index: next, total: next_total }) => {
                total == next_total && *next == index + 1 && *next < *total
            }
            (Correcting { index, total }, Reassembling) => index + 1 == *total,
            (Correcting { .. }, Failed) => true,
            (Reassembling, Committed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Chunking => write!(f, "CHUNKING"),
            Self::Correcting { index, total } => write!(f, "CORRECTING({}/{})", index + 1, total),
            Self::Reassembling => write!(f, "REASSEMBLING"),
            Self::Committed => write!(f, "COMMITTED"),
            Self::Skipped => write!(f, "SKIPPED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Why a record was not sent to the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Completed by an earlier run
    AlreadyComplete,
    /// Committed earlier in this run under the same key
    Duplicate,
    /// Empty text or the `[]` sentinel; not marked complete
    NoData,
    /// Row could not be read as a record
    Malformed,
}

/// Terminal result of one source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Committed { key: String, chunks: usize, chars: usize },
    Skipped { key: Option<String>, reason: SkipReason },
    Failed { key: String, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            RecordState::Pending,
            RecordState::Chunking,
            RecordState::Correcting { index: 0, total: 2 },
            RecordState::Correcting { index: 1, total: 2 },
            RecordState::Reassembling,
            RecordState::Committed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!RecordState::Pending.can_transition_to(&RecordState::Committed));
        assert!(!RecordState::Chunking.can_transition_to(&RecordState::Failed));
        assert!(
            !RecordState::Correcting { index: 0, total: 2 }.can_transition_to(&RecordState::Reassembling)
        );
        assert!(
            !RecordState::Correcting { index: 1, total: 2 }
                .can_transition_to(&RecordState::Correcting { index: 2, total: 2 })
        );
        assert!(!RecordState::Committed.can_transition_to(&RecordState::Pending));
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordState::Correcting { index: 0, total: 3 }.to_string(), "CORRECTING(1/3)");
    }
}
