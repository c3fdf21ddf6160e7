//! The top-posts fetcher and the source capability it is built on.

use async_trait::async_trait;
use std::sync::Arc;
use topposts_core::{CoreError, FetchConfig, RedditPost, TimeFilter};
use tracing::{debug, info};

/// Anything that can list a subreddit's top posts for a time window.
#[async_trait]
pub trait TopPostsSource: Send + Sync {
    async fn fetch_top(
        &self,
        forum: &str,
        limit: u32,
        time_filter: TimeFilter,
    ) -> Result<Vec<RedditPost>, CoreError>;
}

#[async_trait]
impl<T: TopPostsSource + ?Sized> TopPostsSource for Arc<T> {
    async fn fetch_top(
        &self,
        forum: &str,
        limit: u32,
        time_filter: TimeFilter,
    ) -> Result<Vec<RedditPost>, CoreError> {
        (**self).fetch_top(forum, limit, time_filter).await
    }
}

/// Fetches the top posts of a subreddit using a fixed [`FetchConfig`].
///
/// Errors from the source are returned untouched.
#[derive(Debug)]
pub struct ForumPostFetcher<S> {
    source: S,
    config: FetchConfig,
}

impl<S: TopPostsSource> ForumPostFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, FetchConfig::default())
    }

    pub fn with_config(source: S, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn get_top_posts(&self, forum_name: &str) -> Result<Vec<RedditPost>, CoreError> {
        self.get_top_posts_with(forum_name, &self.config).await
    }

    /// Same as [`get_top_posts`](Self::get_top_posts) with a one-off configuration.
    pub async fn get_top_posts_with(
        &self,
        forum_name: &str,
        config: &FetchConfig,
    ) -> Result<Vec<RedditPost>, CoreError> {
        debug!(
            "Fetching top {} posts of r/{} for the last {}",
            config.limit, forum_name, config.time_filter
        );

        let mut posts = self
            .source
            .fetch_top(forum_name, config.limit, config.time_filter)
            .await?;
        posts.truncate(config.limit as usize);

        info!("Fetched {} top posts from r/{}", posts.len(), forum_name);
        Ok(posts)
    }
}
