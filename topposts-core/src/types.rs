use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of posts fetched per subreddit unless configured otherwise.
pub const DEFAULT_POST_LIMIT: u32 = 3;

/// Largest page Reddit serves for a listing request.
pub const MAX_POST_LIMIT: u32 = 100;

/// A single submission as returned by Reddit, in the order Reddit ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub score: i64,
    pub num_comments: u64,
    pub over_18: bool,
    pub created_utc: i64,
}

impl RedditPost {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc, 0)
    }
}

/// Window restricting the "top" ranking to recent posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            _ => Err(ConfigError::InvalidValue {
                field: "time_filter".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// How many posts to request and over which window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub limit: u32,
    pub time_filter: TimeFilter,
}

impl FetchConfig {
    pub fn new(limit: u32, time_filter: TimeFilter) -> Self {
        Self { limit, time_filter }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 || self.limit > MAX_POST_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "fetch.limit".to_string(),
                value: self.limit.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_POST_LIMIT,
            time_filter: TimeFilter::Day,
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("reddit.client_id", &self.client_id),
            ("reddit.client_secret", &self.client_secret),
            ("reddit.user_agent", &self.user_agent),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

// Keeps the secret out of logs.
impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
