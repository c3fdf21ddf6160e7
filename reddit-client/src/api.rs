use crate::DEFAULT_REQUEST_TIMEOUT;
use reqwest::header::RETRY_AFTER;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use topposts_core::{CoreError, RedditApiError, RedditPost, TimeFilter};
use tracing::{debug, error, info, warn};
use url::Url;

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: String,
    pub subreddit: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub is_self: bool,
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    base_url: Url,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        Self::with_base_url(user_agent, REDDIT_API_BASE, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(
        user_agent: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url).map_err(|e| CoreError::InvalidInput {
            message: format!("Invalid API base URL {}: {}", base_url, e),
        })?;

        // Reddit answers unknown subreddits with a redirect to search.
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Builds `{base}/r/{subreddit}/top`. The name is a single path segment, so
    /// a `/` inside it is percent-encoded rather than changing the route.
    ///
    /// `.` and `..` cannot be kept as a segment (URL normalization removes them
    /// and the request would hit `/r/top`), so they are reported as not found
    /// without a request.
    pub fn top_posts_url(&self, subreddit: &str) -> Result<Url, CoreError> {
        if subreddit == "." || subreddit == ".." {
            return Err(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            }
            .into());
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::InvalidInput {
                message: format!("API base URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(["r", subreddit, "top"]);
        Ok(url)
    }

    async fn make_request(
        &self,
        method: Method,
        url: Url,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let endpoint = url.path().to_string();
        let start_time = Instant::now();

        let request_builder = self
            .http_client
            .request(method.clone(), url)
            .bearer_auth(access_token)
            .query(query_params);

        info!("Making Reddit API request: {} {}", method, endpoint);
        match request_builder.send().await {
            Ok(response) => {
                debug!(
                    "{} {} answered {} in {:?}",
                    method,
                    endpoint,
                    response.status(),
                    start_time.elapsed()
                );
                Ok(response)
            }
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    Err(CoreError::RedditApi(RedditApiError::RequestTimeout))
                } else {
                    Err(CoreError::Network(e))
                }
            }
        }
    }

    pub async fn get_top_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
        time_filter: TimeFilter,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let url = self.top_posts_url(subreddit)?;
        let limit_str = limit.to_string();
        let params = [
            ("t", time_filter.as_str()),
            ("limit", limit_str.as_str()),
            ("raw_json", "1"),
        ];

        let response = self
            .make_request(Method::GET, url, access_token, &params)
            .await?;
        let response = check_status(response, subreddit)?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        let posts: Vec<RedditPost> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        info!(
            "Retrieved {} top posts ({}) from r/{}",
            posts.len(),
            time_filter,
            subreddit
        );
        Ok(posts)
    }
}

fn check_status(response: Response, subreddit: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    error!("Request failed with status: {} for r/{}", status, subreddit);

    let err: CoreError = match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }.into()
        }
        401 => RedditApiError::InvalidToken.into(),
        403 => RedditApiError::Forbidden {
            resource: format!("r/{}", subreddit),
        }
        .into(),
        404 => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        }
        .into(),
        _ if status.is_redirection() => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        }
        .into(),
        _ if status.is_server_error() => RedditApiError::ServerError {
            status_code: status.as_u16(),
        }
        .into(),
        code => CoreError::RequestFailed {
            message: format!("Unexpected status {} for r/{}", status, subreddit),
            status_code: Some(code),
        },
    };
    Err(err)
}

impl From<RedditPostData> for RedditPost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            content: if post_data.is_self && !post_data.selftext.is_empty() {
                Some(post_data.selftext)
            } else {
                None
            },
            author: post_data.author,
            subreddit: post_data.subreddit,
            url: post_data.url,
            permalink: post_data.permalink,
            score: post_data.score,
            num_comments: post_data.num_comments,
            over_18: post_data.over_18,
            created_utc: post_data.created_utc as i64,
        }
    }
}
