pub mod twitter;


use async_trait::async_trait;

use crate::models::Mention;

/// Where mentions come from.
#[async_trait]
pub trait MentionSource: Send + Sync {
    async fn fetch_mentions(&self, count: usize) -> Result<Vec<Mention>, anyhow::Error>;
}

/// Where replies go.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Names of the posting credentials that are not configured.
    fn missing_credentials(&self) -> Vec<&'static str>;

    async fn post_reply(&self, text: &str, in_reply_to: &str) -> Result<(), anyhow::Error>;
}
