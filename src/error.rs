use thiserror::Error;

/// Failure kinds reported by the language-model backed components.
///
/// The set is closed on purpose: callers pick a fallback value from the kind
/// instead of inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("language model credentials are not configured")]
    CredentialsMissing,

    #[error("language model call failed after {attempts} attempt(s): {message}")]
    Transient { attempts: u32, message: String },

    #[error("language model returned an unusable response: {raw}")]
    MalformedResponse { raw: String },
}

impl ServiceError {
    pub fn transient(message: impl Into<String>) -> Self {
        ServiceError::Transient {
            attempts: 1,
            message: message.into(),
        }
    }

    pub fn malformed(raw: impl Into<String>) -> Self {
        ServiceError::MalformedResponse { raw: raw.into() }
    }
}
