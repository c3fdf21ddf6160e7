pub mod api;
pub mod auth;
pub mod fetcher;


pub use api::{RedditApiClient, REDDIT_API_BASE};
pub use auth::{RedditAuthenticator, RedditToken, REDDIT_TOKEN_URL};
pub use fetcher::{ForumPostFetcher, TopPostsSource};

use async_trait::async_trait;
use std::time::Duration;
use topposts_core::{CoreError, RedditCredentials, RedditPost, TimeFilter};
use tracing::debug;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the client talks to and how long each request may take. Defaults to
/// the public Reddit hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditEndpoints {
    pub token_url: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            token_url: REDDIT_TOKEN_URL.to_string(),
            api_base: REDDIT_API_BASE.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Reddit-backed [`TopPostsSource`]: every call authenticates once and reads
/// one listing page.
#[derive(Debug)]
pub struct RedditClient {
    authenticator: RedditAuthenticator,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Result<Self, CoreError> {
        Self::with_endpoints(credentials, RedditEndpoints::default())
    }

    pub fn with_endpoints(
        credentials: RedditCredentials,
        endpoints: RedditEndpoints,
    ) -> Result<Self, CoreError> {
        credentials.validate()?;
        debug!("Creating Reddit client for {:?}", credentials);

        let authenticator = RedditAuthenticator::with_token_url(
            &credentials,
            &endpoints.token_url,
            endpoints.timeout,
        )?;
        let api = RedditApiClient::with_base_url(
            credentials.user_agent,
            &endpoints.api_base,
            endpoints.timeout,
        )?;

        Ok(Self { authenticator, api })
    }

    pub fn api(&self) -> &RedditApiClient {
        &self.api
    }
}

#[async_trait]
impl TopPostsSource for RedditClient {
    async fn fetch_top(
        &self,
        forum: &str,
        limit: u32,
        time_filter: TimeFilter,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let token = self.authenticator.authenticate().await?;
        self.api
            .get_top_posts(&token.access_token, forum, limit, time_filter)
            .await
    }
}
