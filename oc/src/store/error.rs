//! Store error types

use std::io;
use thiserror::Error;

/// Persistence failures; all of them stop the run
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write output sink: {0}")]
    SinkWrite(#[source] io::Error),

    #[error("failed to read output sink: {0}")]
    SinkRead(#[source] io::Error),

    #[error("failed to write checkpoint log: {0}")]
    CheckpointWrite(#[source] io::Error),

    #[error("failed to read checkpoint log: {0}")]
    CheckpointRead(#[source] io::Error),
}
