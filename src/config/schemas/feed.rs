use crate::errors::CoreError;

/// Block-subscription endpoint the feed pool connects subscriptions against.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub token: String,
}

impl FeedConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            url: super::require_env("FEED_URL")?,
            token: super::require_env("FEED_TOKEN")?,
        })
    }

    pub fn for_tests() -> Self {
        Self { url: "http://localhost:10000".to_string(), token: "test-token".to_string() }
    }
}
