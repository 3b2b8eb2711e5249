//! OracleClient - retry policy and length ceiling around an Oracle

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::{LengthBound, Oracle, OracleError, RetryPolicy};
use crate::domain::{Chunk, CorrectionResult};

/// Single entry point the pipeline uses to correct text
pub struct OracleClient {
    oracle: Arc<dyn Oracle>,
    policy: RetryPolicy,
    bound: LengthBound,
    calls: AtomicU64,
}

impl OracleClient {
    pub fn new(oracle: Arc<dyn Oracle>, policy: RetryPolicy, bound: LengthBound) -> Self {
        debug!(?policy, ?bound, "OracleClient::new: called");
        Self {
            oracle,
            policy,
            bound,
            calls: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Oracle calls made so far, failed ones included
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// One oracle call, bounded by the input's length
    pub async fn correct(&self, text: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let raw = self.oracle.correct(text).await?;
        Ok(self.bound.apply(text, &raw))
    }

    /// Correct a chunk under the retry policy
    pub async fn correct_chunk(&self, chunk: &Chunk) -> Result<CorrectionResult, OracleError> {
        debug!(key = %chunk.record_key, index = chunk.index, "OracleClient::correct_chunk: called");
        let text = chunk.text.as_str();
        let index = chunk.index;
        let (corrected_text, attempts) = self
            .policy
            .run(move |attempt| {
                debug!(index, attempt, "correct_chunk: attempt");
                self.correct(text)
            })
            .await?;

        Ok(CorrectionResult {
            chunk: chunk.clone(),
            corrected_text,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{Script, ScriptedOracle};
    use std::time::Duration;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            record_key: "1880-01-01".to_string(),
            index: 0,
            text: text.to_string(),
        }
    }

    fn client(oracle: ScriptedOracle) -> OracleClient {
        OracleClient::new(
            Arc::new(oracle),
            RetryPolicy::new(3, Duration::ZERO),
            LengthBound::default(),
        )
    }

    #[tokio::test]
    async fn test_correct_chunk_bounds_output() {
        let client = client(ScriptedOracle::new(
            vec![Script::Reply("The wind blew and then a great deal more".to_string())],
            Script::Echo,
        ));

        let result = client.correct_chunk(&chunk("Tbe wind blew")).await.unwrap();
        assert_eq!(result.corrected_text, "The wind blew");
        assert_eq!(result.attempts, 1);
        assert!(result.corrected_text.chars().count() <= result.chunk.char_len());
    }

    #[tokio::test]
    async fn test_correct_chunk_retries_transient() {
        let client = client(ScriptedOracle::new(vec![Script::Transient, Script::Transient], Script::Echo));

        let result = client.correct_chunk(&chunk("rain")).await.unwrap();
        assert_eq!(result.corrected_text, "rain");
        assert_eq!(result.attempts, 3);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_correct_chunk_exhausted() {
        let client = client(ScriptedOracle::new(vec![], Script::Transient));

        let err = client.correct_chunk(&chunk("rain")).await.unwrap_err();
        assert!(matches!(err, OracleError::Exhausted { attempts: 3, .. }));
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_rejected_not_retried() {
        let client = client(ScriptedOracle::new(vec![Script::Reject], Script::Echo));

        assert!(matches!(
            client.correct_chunk(&chunk("rain")).await,
            Err(OracleError::Rejected(_))
        ));
        assert_eq!(client.calls(), 1);
    }
}
