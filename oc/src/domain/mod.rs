//! Domain types
//!
//! Records come from the source, chunks are derived from records and never
//! persisted, correction results are what the oracle client hands back.

mod record;
pub mod text;

pub use record::{Chunk, CorrectionResult, Record};
