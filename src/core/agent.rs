use async_trait::async_trait;
use rig::completion::{CompletionModel, CompletionRequestBuilder, ModelChoice};
use rig::providers::openai;

use crate::config::OpenAiConfig;
use crate::error::ServiceError;

/// A single-turn chat request: optional system preamble plus one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f64,
}

/// The language-model service as the analyzer and replier see it.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the text of the first completion.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ServiceError>;
}

pub struct Agent {
    client: openai::Client,
    model: String,
}

impl Agent {
    pub fn new(api_key: &str, model: &str) -> Self {
        Agent {
            client: openai::Client::new(api_key),
            model: model.to_string(),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &OpenAiConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .map(|key| Agent::new(key, &config.model))
    }

    /// Without a system prompt the request carries the user message alone.
    fn completion_request(
        &self,
        request: &ChatRequest,
    ) -> CompletionRequestBuilder<openai::CompletionModel> {
        let builder = self
            .client
            .completion_model(&self.model)
            .completion_request(&request.prompt)
            .temperature(request.temperature);
        match &request.system {
            Some(system) => builder.preamble(system.clone()),
            None => builder,
        }
    }
}

#[async_trait]
impl LanguageModel for Agent {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ServiceError> {
        // Every provider-side failure is worth another try, same as rate limits
        let response = self
            .completion_request(request)
            .send()
            .await
            .map_err(|e| ServiceError::transient(e.to_string()))?;

        match response.choice {
            ModelChoice::Message(text) => Ok(text),
            ModelChoice::ToolCall(name, _) => Err(ServiceError::malformed(format!(
                "unexpected tool call: {}",
                name
            ))),
        }
    }
}
