use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_oauth1::OAuthClientProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TwitterConfig;
use crate::models::Mention;
use crate::providers::{MentionSource, ReplySink};

// Bounds the v2 mentions endpoint accepts for max_results
const MIN_PAGE_SIZE: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct MentionsResponse {
    #[serde(default)]
    pub data: Vec<TweetData>,
}

#[derive(Debug, Deserialize)]
pub struct TweetData {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTweet<'a> {
    pub text: &'a str,
    pub reply: ReplySettings<'a>,
}

#[derive(Debug, Serialize)]
pub struct ReplySettings<'a> {
    pub in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateTweetResponse {
    pub data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
pub struct CreatedTweet {
    pub id: String,
}

pub struct Twitter {
    config: TwitterConfig,
    client: reqwest::Client,
}

impl Twitter {
    pub fn new(config: TwitterConfig) -> Self {
        Twitter {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    pub async fn get_mentions(&self, count: usize) -> Result<Vec<Mention>> {
        let (Some(bearer_token), Some(user_id)) =
            (&self.config.bearer_token, &self.config.user_id)
        else {
            warn!("Twitter credentials are missing. Please set TWITTER_BEARER_TOKEN and TWITTER_USER_ID.");
            return Ok(Vec::new());
        };
        if count == 0 {
            return Ok(Vec::new());
        }

        let url = self.url(&format!("/2/users/{}/mentions", user_id));
        let page_size = page_size(count);
        debug!(%url, page_size, "requesting mentions");

        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer_token)
            .query(&[("max_results", page_size.to_string())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch mentions: {} - {}",
                status,
                body
            ));
        }

        parse_mentions(&body, count)
    }

    /// Posts a reply and returns the new tweet's id when the response carries one.
    pub async fn reply_to_tweet(&self, tweet_id: &str, text: &str) -> Result<Option<String>> {
        let secrets = self
            .config
            .oauth_secrets()
            .ok_or_else(|| anyhow::anyhow!("Missing Twitter credentials for posting replies."))?;
        let secrets = reqwest_oauth1::Secrets::new(secrets.consumer_key, secrets.consumer_secret)
            .token(secrets.access_token, secrets.access_token_secret);

        let payload = serde_json::to_string(&CreateTweet {
            text,
            reply: ReplySettings {
                in_reply_to_tweet_id: tweet_id,
            },
        })?;

        let response = self
            .client
            .clone()
            .oauth1(secrets)
            .post(self.url("/2/tweets"))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("Failed to post reply: {} - {}", status, body));
        }

        // The reply is live once the API answers 2xx, whatever the body says
        match serde_json::from_str::<CreateTweetResponse>(&body) {
            Ok(created) => {
                info!(in_reply_to = tweet_id, reply_id = %created.data.id, "reply posted");
                Ok(Some(created.data.id))
            }
            Err(e) => {
                warn!(
                    in_reply_to = tweet_id,
                    status = %status,
                    body = %body,
                    error = %e,
                    "reply posted but response was unreadable"
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MentionSource for Twitter {
    async fn fetch_mentions(&self, count: usize) -> Result<Vec<Mention>> {
        self.get_mentions(count).await
    }
}

#[async_trait]
impl ReplySink for Twitter {
    fn missing_credentials(&self) -> Vec<&'static str> {
        self.config.missing_posting_credentials()
    }

    async fn post_reply(&self, text: &str, in_reply_to: &str) -> Result<()> {
        self.reply_to_tweet(in_reply_to, text).await.map(|_| ())
    }
}

pub fn page_size(count: usize) -> usize {
    count.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Decodes a mentions page, keeping at most `count` tweets in API order.
pub fn parse_mentions(body: &str, count: usize) -> Result<Vec<Mention>> {
    let page: MentionsResponse = serde_json::from_str(body)?;
    Ok(page
        .data
        .into_iter()
        .take(count)
        .map(|tweet| Mention::new(tweet.id, tweet.text))
        .collect())
}
