//! Scripted oracle double
//!
//! Plays back a fixed sequence of outcomes, then repeats a fallback. Lets
//! tests drive the pipeline without a network.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Oracle, OracleError};
use crate::llm::LlmError;

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum Script {
    /// Return the input unchanged
    Echo,
    /// Return this text
    Reply(String),
    /// Fail with a retryable error
    Transient,
    /// Fail with a non-retryable error
    Reject,
}

pub struct ScriptedOracle {
    steps: Mutex<VecDeque<Script>>,
    fallback: Script,
    inputs: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(steps: Vec<Script>, fallback: Script) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            fallback,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Always echo
    pub fn echo() -> Self {
        Self::new(Vec::new(), Script::Echo)
    }

    /// Every input seen, in call order
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.inputs.lock().map(|v| v.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn correct(&self, text: &str) -> Result<String, OracleError> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(text.to_string());
        }
        let step = self
            .steps
            .lock()
            .ok()
            .and_then(|mut steps| steps.pop_front())
            .unwrap_or_else(|| self.fallback.clone());

        match step {
            Script::Echo => Ok(text.to_string()),
            Script::Reply(reply) => Ok(reply),
            Script::Transient => Err(LlmError::Timeout(Duration::from_millis(1)).into()),
            Script::Reject => Err(LlmError::ApiError {
                status: 400,
                message: "scripted rejection".to_string(),
            }
            .into()),
        }
    }
}
