//! Pipeline driver
//!
//! Reads records in source order, skips what the Progress Store already
//! knows, corrects each remaining record chunk by chunk and commits it.
//! A failed chunk abandons its record, which stays pending for the next run.

mod driver;
mod error;
mod state;
mod summary;

pub use driver::{Pipeline, PipelineOptions};
pub use error::PipelineError;
pub use state::{RecordOutcome, RecordState, SkipReason};
pub use summary::RunSummary;
