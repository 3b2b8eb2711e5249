//! Retry policy for oracle calls

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::OracleError;

/// Fixed-delay retry policy, shared by every oracle call site
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// `op` receives the 1-based attempt number. On success returns the value
    /// and the number of attempts spent. Transient failures on the last
    /// attempt come back as [`OracleError::Exhausted`].
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<(T, u32), OracleError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    debug!(attempt, "RetryPolicy::run: success");
                    return Ok((value, attempt));
                }
                Err(e) if !e.is_transient() => {
                    debug!(attempt, error = %e, "RetryPolicy::run: permanent failure");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(attempt, error = %e, "Oracle retries exhausted");
                    return Err(OracleError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(attempt, max_attempts, delay_ms = self.delay.as_millis() as u64, error = %e, "Oracle call failed, retrying");
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> OracleError {
        OracleError::Transient(LlmError::Timeout(Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let (value, attempts) = policy
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { if attempt < 3 { Err(transient()) } else { Ok("fixed") } }
            })
            .await
            .unwrap();

        assert_eq!(value, "fixed");
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let result: Result<((), u32), _> = policy.run(|_| async { Err(transient()) }).await;

        match result {
            Err(OracleError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 2);
                assert!(last.is_transient());
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<((), u32), _> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OracleError::Prompt("bad template".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(OracleError::Prompt(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
