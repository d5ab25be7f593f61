//! Reply composition from a classified mention.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::core::agent::{ChatRequest, LanguageModel};
use crate::core::retry::RetryPolicy;
use crate::error::ServiceError;
use crate::models::Classification;

pub const SYSTEM_PROMPT: &str = "You are ReasonBot, a calm and strategic debater.";
pub const NO_CREDENTIALS_REPLY: &str = "ReasonBot cannot respond right now.";
pub const ERROR_REPLY: &str = "ReasonBot encountered an error and cannot reply.";

#[async_trait]
pub trait Composer: Send + Sync {
    async fn compose_reply(
        &self,
        classification: &Classification,
        text: &str,
    ) -> Result<String, ServiceError>;
}

pub struct ReplyComposer {
    model: Option<Arc<dyn LanguageModel>>,
    retry: RetryPolicy,
}

impl ReplyComposer {
    pub fn new(model: Option<Arc<dyn LanguageModel>>, retry: RetryPolicy) -> Self {
        ReplyComposer { model, retry }
    }

    pub async fn try_compose(
        &self,
        classification: &Classification,
        text: &str,
    ) -> Result<String, ServiceError> {
        let model = self.model.as_ref().ok_or(ServiceError::CredentialsMissing)?;
        let request = ChatRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: build_prompt(classification, text),
            temperature: 0.7,
        };

        let reply = self.retry.run(|| model.complete(&request)).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(ServiceError::malformed(reply));
        }
        Ok(reply.to_string())
    }

    /// Never fails: errors become one of the fixed fallback replies.
    pub async fn compose(&self, classification: &Classification, text: &str) -> String {
        match self.try_compose(classification, text).await {
            Ok(reply) => reply,
            Err(e) => fallback_reply(&e).to_string(),
        }
    }
}

#[async_trait]
impl Composer for ReplyComposer {
    async fn compose_reply(
        &self,
        classification: &Classification,
        text: &str,
    ) -> Result<String, ServiceError> {
        self.try_compose(classification, text).await
    }
}

pub fn fallback_reply(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::CredentialsMissing => {
            warn!("OPENAI_API_KEY is not set; returning fallback reply");
            NO_CREDENTIALS_REPLY
        }
        ServiceError::Transient { .. } | ServiceError::MalformedResponse { .. } => {
            error!(error = %err, "reply generation failed");
            ERROR_REPLY
        }
    }
}

/// Instruction order is fixed: base rules first, then the conditional ones.
pub fn build_prompt(classification: &Classification, text: &str) -> String {
    let tone_rule = format!("Respond in a {} tone", classification.reply_tone);
    let mut instructions = vec![
        tone_rule.as_str(),
        "no more than 50 words",
        "avoid moralizing",
        "use cause-effect reasoning",
    ];

    if classification.contains_slur {
        instructions.push("acknowledge the hateful language without repeating it");
    }

    if matches!(classification.ideology.as_str(), "conspiracy" | "extremist") {
        instructions.push("highlight factual contradictions");
    }

    if matches!(classification.emotion.as_str(), "anger" | "rage")
        || classification.tone == "aggressive"
    {
        instructions.push("defuse the tension");
    }

    format!(
        "You are ReasonBot. {}.\nTweet: {}",
        instructions.join("; "),
        text
    )
}
