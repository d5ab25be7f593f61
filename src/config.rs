use std::env;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TWITTER_API_BASE: &str = "https://api.twitter.com";

/// Process-wide settings, read once at start-up and handed to each component.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub twitter: TwitterConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Default)]
pub struct TwitterConfig {
    pub api_base: String,
    pub bearer_token: Option<String>,
    pub user_id: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
}

/// The four secrets needed to sign a user-context request.
#[derive(Debug, Clone)]
pub struct OAuthSecrets {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Config {
            twitter: TwitterConfig {
                api_base: get("TWITTER_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWITTER_API_BASE.to_string()),
                bearer_token: get("TWITTER_BEARER_TOKEN"),
                user_id: get("TWITTER_USER_ID"),
                consumer_key: get("TWITTER_API_KEY"),
                consumer_secret: get("TWITTER_API_SECRET"),
                access_token: get("TWITTER_ACCESS_TOKEN"),
                access_token_secret: get("TWITTER_ACCESS_SECRET"),
            },
            openai: OpenAiConfig {
                api_key: get("OPENAI_API_KEY"),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
        }
    }
}

impl TwitterConfig {
    /// Names of the posting credentials that are not set.
    pub fn missing_posting_credentials(&self) -> Vec<&'static str> {
        [
            ("TWITTER_BEARER_TOKEN", &self.bearer_token),
            ("TWITTER_API_KEY", &self.consumer_key),
            ("TWITTER_API_SECRET", &self.consumer_secret),
            ("TWITTER_ACCESS_TOKEN", &self.access_token),
            ("TWITTER_ACCESS_SECRET", &self.access_token_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn oauth_secrets(&self) -> Option<OAuthSecrets> {
        Some(OAuthSecrets {
            consumer_key: self.consumer_key.clone()?,
            consumer_secret: self.consumer_secret.clone()?,
            access_token: self.access_token.clone()?,
            access_token_secret: self.access_token_secret.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn blank_values_are_treated_as_missing() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "   "),
            ("TWITTER_BEARER_TOKEN", "bearer"),
        ]));

        assert_eq!(config.openai.api_key, None);
        assert_eq!(config.twitter.bearer_token.as_deref(), Some("bearer"));
        assert_eq!(config.openai.model, DEFAULT_MODEL);
        assert_eq!(config.twitter.api_base, DEFAULT_TWITTER_API_BASE);
    }

    #[test]
    fn reports_each_missing_posting_credential() {
        let config = Config::from_lookup(lookup(&[
            ("TWITTER_BEARER_TOKEN", "b"),
            ("TWITTER_API_KEY", "k"),
            ("TWITTER_ACCESS_TOKEN", "t"),
        ]));

        assert_eq!(
            config.twitter.missing_posting_credentials(),
            vec!["TWITTER_API_SECRET", "TWITTER_ACCESS_SECRET"]
        );
        assert!(config.twitter.oauth_secrets().is_none());
    }

    #[test]
    fn complete_posting_credentials() {
        let config = Config::from_lookup(lookup(&[
            ("TWITTER_BEARER_TOKEN", "b"),
            ("TWITTER_API_KEY", "k"),
            ("TWITTER_API_SECRET", "s"),
            ("TWITTER_ACCESS_TOKEN", "t"),
            ("TWITTER_ACCESS_SECRET", "ts"),
        ]));

        assert!(config.twitter.missing_posting_credentials().is_empty());
        let secrets = config.twitter.oauth_secrets().unwrap();
        assert_eq!(secrets.consumer_key, "k");
        assert_eq!(secrets.access_token_secret, "ts");
    }
}
