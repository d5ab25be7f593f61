// Shared fakes for the core tests.


use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::agent::{ChatRequest, LanguageModel};
use crate::error::ServiceError;

/// Language model that plays back canned answers in order.
/// `Err` entries come back as transient failures.
pub struct ScriptedModel {
    answers: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn replying(answers: &[Result<&str, &str>]) -> Arc<Self> {
        let answers = answers
            .iter()
            .map(|a| (*a).map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(ScriptedModel {
            answers: Mutex::new(answers),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ServiceError::transient(message)),
            None => Err(ServiceError::transient("script exhausted")),
        }
    }
}
