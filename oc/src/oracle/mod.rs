//! Correction oracle
//!
//! The oracle is the external service that fixes noisy text. This module
//! wraps it in an [`OracleClient`] that owns the single retry policy and
//! enforces the length ceiling: corrected text never has more characters
//! than the chunk it came from.

use async_trait::async_trait;

mod bound;
mod client;
mod error;
mod llm;
mod retry;
pub mod scripted;

pub use bound::{LengthBound, SENTENCE_ENDINGS};
pub use client::OracleClient;
pub use error::OracleError;
pub use llm::LlmOracle;
pub use retry::RetryPolicy;
pub use scripted::{Script, ScriptedOracle};

/// One attempt at correcting one chunk of text
///
/// Implementations perform exactly one external call and never retry.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn correct(&self, text: &str) -> Result<String, OracleError>;
}
