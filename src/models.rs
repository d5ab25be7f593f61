use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// An inbound tweet that mentions the bot account.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Mention {
    pub id: String,
    pub text: String,
}

impl Mention {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Mention {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Tone and intent of a mention, as judged by the language model.
///
/// Every field has a default. A key that is missing, null or of the wrong type
/// takes its default while the other keys are kept.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "ClassificationFields")]
pub struct Classification {
    pub tone: String,
    pub ideology: String,
    pub emotion: String,
    pub contains_slur: bool,
    pub reply_tone: String,
}

impl Default for Classification {
    fn default() -> Self {
        Classification {
            tone: "neutral".to_string(),
            ideology: "unknown".to_string(),
            emotion: "neutral".to_string(),
            contains_slur: false,
            reply_tone: "calm".to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ClassificationFields {
    #[serde(deserialize_with = "lenient")]
    tone: Option<String>,
    #[serde(deserialize_with = "lenient")]
    ideology: Option<String>,
    #[serde(deserialize_with = "lenient")]
    emotion: Option<String>,
    #[serde(deserialize_with = "lenient")]
    contains_slur: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    reply_tone: Option<String>,
}

impl From<ClassificationFields> for Classification {
    fn from(fields: ClassificationFields) -> Self {
        let defaults = Classification::default();
        Classification {
            tone: fields.tone.unwrap_or(defaults.tone),
            ideology: fields.ideology.unwrap_or(defaults.ideology),
            emotion: fields.emotion.unwrap_or(defaults.emotion),
            contains_slur: fields.contains_slur.unwrap_or(defaults.contains_slur),
            reply_tone: fields.reply_tone.unwrap_or(defaults.reply_tone),
        }
    }
}

// Any JSON value is accepted; one that doesn't fit the field's type reads as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub replied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// How a dispatch pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    CooldownActive,
    NoMentions,
    MissingCredentials(Vec<&'static str>),
    Completed(PassSummary),
}
