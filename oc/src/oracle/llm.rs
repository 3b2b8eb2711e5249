//! Oracle backed by a chat-completion LLM

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Oracle, OracleError};
use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::{CorrectionContext, PromptLoader};

/// Renders the correction prompts and sends one request per call
pub struct LlmOracle {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    source_kind: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl LlmOracle {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, source_kind: impl Into<String>) -> Self {
        Self {
            llm,
            prompts,
            source_kind: source_kind.into(),
            max_tokens: LlmConfig::default().max_tokens,
            temperature: None,
        }
    }

    /// Take token budget and temperature from config
    pub fn with_config(mut self, config: &LlmConfig) -> Self {
        self.max_tokens = config.max_tokens;
        self.temperature = Some(config.temperature);
        self
    }

    fn build_request(&self, text: &str) -> Result<CompletionRequest, OracleError> {
        let system_prompt = self
            .prompts
            .render(
                "correct-system",
                &CorrectionContext {
                    source_kind: &self.source_kind,
                    text: "",
                },
            )
            .map_err(|e| OracleError::Prompt(e.to_string()))?;
        let user_prompt = self
            .prompts
            .render(
                "correct-user",
                &CorrectionContext {
                    source_kind: &self.source_kind,
                    text,
                },
            )
            .map_err(|e| OracleError::Prompt(e.to_string()))?;

        Ok(CompletionRequest {
            system_prompt,
            messages: vec![Message::user(user_prompt.trim_end())],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        })
    }
}

#[async_trait]
impl Oracle for LlmOracle {
    async fn correct(&self, text: &str) -> Result<String, OracleError> {
        debug!(model = self.llm.model(), chars = text.len(), "LlmOracle::correct: called");
        let request = self.build_request(text)?;
        let response = self.llm.complete(request).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "LlmOracle::correct: response"
        );
        response
            .content
            .map(|c| c.trim().to_string())
            .ok_or(OracleError::EmptyResponse)
    }
}
