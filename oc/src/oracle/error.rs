//! Oracle error types

use thiserror::Error;

use crate::llm::LlmError;

/// Why a chunk could not be corrected
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network, rate limit, timeout or 5xx; worth another attempt
    #[error("transient oracle failure: {0}")]
    Transient(#[source] LlmError),

    /// The provider refused the request; repeating it will not help
    #[error("oracle rejected the request: {0}")]
    Rejected(#[source] LlmError),

    #[error("oracle returned no text")]
    EmptyResponse,

    #[error("prompt rendering failed: {0}")]
    Prompt(String),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<OracleError> },
}

impl OracleError {
    /// Whether the retry policy may spend another attempt on this error
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Transient(_) | OracleError::EmptyResponse)
    }
}

impl From<LlmError> for OracleError {
    fn from(err: LlmError) -> Self {
        if err.is_retryable() {
            OracleError::Transient(err)
        } else {
            OracleError::Rejected(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_classification_from_llm_error() {
        let err: OracleError = LlmError::Timeout(Duration::from_secs(5)).into();
        assert!(err.is_transient());

        let err: OracleError = LlmError::ApiError {
            status: 400,
            message: "bad request".to_string(),
        }
        .into();
        assert!(matches!(err, OracleError::Rejected(_)));
        assert!(!err.is_transient());

        // A 200 with a body that is not a completion
        let malformed = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: OracleError = LlmError::Json(malformed).into();
        assert!(matches!(err, OracleError::Rejected(_)));
    }

    #[test]
    fn test_exhausted_message_names_last_error() {
        let err = OracleError::Exhausted {
            attempts: 3,
            last: Box::new(OracleError::EmptyResponse),
        };
        assert_eq!(err.to_string(), "gave up after 3 attempts: oracle returned no text");
        assert!(!err.is_transient());
    }
}
