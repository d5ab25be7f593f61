//! Tone and ideology classification of a mention.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::core::agent::{ChatRequest, LanguageModel};
use crate::core::retry::RetryPolicy;
use crate::error::ServiceError;
use crate::models::Classification;

/// Anything that can classify a mention. The dispatcher only sees this.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Classification, ServiceError>;
}

pub struct ContextAnalyzer {
    model: Option<Arc<dyn LanguageModel>>,
    retry: RetryPolicy,
}

impl ContextAnalyzer {
    /// `model` is `None` when the service has no credential configured.
    pub fn new(model: Option<Arc<dyn LanguageModel>>, retry: RetryPolicy) -> Self {
        ContextAnalyzer { model, retry }
    }

    pub async fn try_classify(&self, text: &str) -> Result<Classification, ServiceError> {
        let model = self.model.as_ref().ok_or(ServiceError::CredentialsMissing)?;
        let request = ChatRequest {
            system: None,
            prompt: build_prompt(text),
            temperature: 0.0,
        };

        let raw = self.retry.run(|| model.complete(&request)).await?;
        parse_classification(&raw)
    }

    /// Never fails: errors are turned into the fallback classification.
    pub async fn classify(&self, text: &str) -> Classification {
        match self.try_classify(text).await {
            Ok(classification) => classification,
            Err(e) => Classification::fallback_for(&e, text),
        }
    }
}

#[async_trait]
impl Analyzer for ContextAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Classification, ServiceError> {
        self.try_classify(text).await
    }
}

impl Classification {
    /// Value to use when classification failed with `err`.
    ///
    /// Only a malformed answer gets the keyword check on the input text; a
    /// failed call falls back to the plain defaults.
    pub fn fallback_for(err: &ServiceError, text: &str) -> Classification {
        let mut fallback = Classification::default();
        match err {
            ServiceError::CredentialsMissing => {
                warn!("OPENAI_API_KEY is not set; using default context analysis");
            }
            ServiceError::Transient { .. } => {
                error!(error = %err, "context analysis failed");
            }
            ServiceError::MalformedResponse { raw } => {
                debug!(raw = %raw, "model answer was not valid JSON");
                fallback.contains_slur = text.to_lowercase().contains("slur");
            }
        }
        fallback
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the tweet below and answer with a compact JSON object containing exactly these keys:\n\
        - \"tone\": overall tone of the tweet (e.g. neutral, hostile, aggressive, sarcastic)\n\
        - \"ideology\": ideological framing (e.g. unknown, mainstream, conspiracy, extremist)\n\
        - \"emotion\": dominant emotion (e.g. neutral, anger, rage, fear, joy)\n\
        - \"contains_slur\": true if the tweet contains a slur, otherwise false\n\
        - \"reply_tone\": the tone a calm, reasoned reply should take (e.g. calm, firm, friendly)\n\
        Return ONLY the JSON object, with no commentary.\n\
        Tweet: {}",
        text
    )
}

/// Reads the model answer, filling any missing or mistyped key with its default.
pub fn parse_classification(raw: &str) -> Result<Classification, ServiceError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|_| ServiceError::malformed(raw))
}

// Models like to wrap JSON in ```json fences even when told not to
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::ScriptedModel;

    fn analyzer(model: &Arc<ScriptedModel>) -> ContextAnalyzer {
        ContextAnalyzer::new(Some(model.clone()), RetryPolicy::immediate(3))
    }

    #[tokio::test]
    async fn valid_json_is_returned_as_is() {
        let model = ScriptedModel::replying(&[Ok(
            r#"{"tone":"hostile","ideology":"extremist","emotion":"anger","contains_slur":true,"reply_tone":"calm"}"#,
        )]);

        let result = analyzer(&model).classify("text").await;

        assert_eq!(
            result,
            Classification {
                tone: "hostile".to_string(),
                ideology: "extremist".to_string(),
                emotion: "anger".to_string(),
                contains_slur: true,
                reply_tone: "calm".to_string(),
            }
        );
        let request = &model.requests()[0];
        assert_eq!(request.temperature, 0.0);
        assert!(request.system.is_none());
        assert!(request.prompt.ends_with("Tweet: text"));
    }

    #[tokio::test]
    async fn partial_json_is_completed_with_defaults() {
        let model = ScriptedModel::replying(&[Ok("```json\n{\"tone\": \"sarcastic\"}\n```")]);

        let result = analyzer(&model).classify("text").await;

        assert_eq!(
            result,
            Classification {
                tone: "sarcastic".to_string(),
                ..Classification::default()
            }
        );
    }

    #[tokio::test]
    async fn mistyped_keys_take_defaults_and_keep_the_rest() {
        let model = ScriptedModel::replying(&[Ok(
            r#"{"tone": null, "contains_slur": "yes", "ideology": 7, "emotion": "anger"}"#,
        )]);

        let result = analyzer(&model).try_classify("text").await;

        assert_eq!(
            result,
            Ok(Classification {
                emotion: "anger".to_string(),
                ..Classification::default()
            })
        );
    }

    #[test]
    fn non_object_answer_is_still_malformed() {
        assert_eq!(
            parse_classification("\"calm\""),
            Err(ServiceError::malformed("\"calm\""))
        );
        assert_eq!(parse_classification("null"), Err(ServiceError::malformed("null")));
    }

    #[tokio::test]
    async fn malformed_answer_falls_back_with_slur_check() {
        let model = ScriptedModel::replying(&[Ok("not json"), Ok("not json")]);

        let analyzer = analyzer(&model);
        assert_eq!(
            analyzer.try_classify("this SLUR text").await,
            Err(ServiceError::malformed("not json"))
        );

        let result = analyzer.classify("this SLUR text").await;
        assert_eq!(
            result,
            Classification {
                contains_slur: true,
                ..Classification::default()
            }
        );
        // One call each: a malformed answer is final, not retried
        assert_eq!(model.requests().len(), 2);
    }

    #[tokio::test]
    async fn missing_credentials_never_call_the_model() {
        let analyzer = ContextAnalyzer::new(None, RetryPolicy::immediate(3));

        assert_eq!(
            analyzer.try_classify("whatever slur").await,
            Err(ServiceError::CredentialsMissing)
        );
        assert_eq!(analyzer.classify("whatever slur").await, Classification::default());
    }

    #[tokio::test]
    async fn exhausted_retries_skip_the_slur_check() {
        let model = ScriptedModel::replying(&[Err("500"), Err("500"), Err("500")]);

        let result = analyzer(&model).classify("slur").await;

        assert_eq!(result, Classification::default());
        assert_eq!(model.requests().len(), 3);
    }

    #[tokio::test]
    async fn transient_error_then_success() {
        let model = ScriptedModel::replying(&[Err("429"), Ok(r#"{"emotion":"rage"}"#)]);

        let result = analyzer(&model).try_classify("grr").await.unwrap();

        assert_eq!(result.emotion, "rage");
        assert_eq!(model.requests().len(), 2);
    }
}
