//! Pipeline error types

use thiserror::Error;

use crate::source::SourceError;
use crate::store::StoreError;

/// Failures that stop a run
///
/// Oracle failures and malformed rows never surface here; they end a single
/// record, not the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
