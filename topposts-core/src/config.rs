//! Application configuration.
//!
//! Settings come from a TOML file; the Reddit credentials can also be
//! supplied (or overridden) through `REDDIT_CLIENT_ID`,
//! `REDDIT_CLIENT_SECRET` and `REDDIT_USER_AGENT`.

use crate::error::{ConfigError, CoreError};
use crate::types::{FetchConfig, RedditCredentials};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "topposts.toml";

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reddit: RedditCredentials,
    pub fetch: FetchConfig,
    pub subreddits: Vec<String>,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads the configuration from `path` (or [`DEFAULT_CONFIG_PATH`]) and the
    /// process environment, then validates it.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = path.is_some();
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)?
        } else if explicit {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        } else {
            debug!(
                "No configuration file at {}, relying on environment",
                path.display()
            );
            let config = Self::default();
            for var_name in [ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_USER_AGENT] {
                if env(var_name).is_none() {
                    return Err(ConfigError::MissingEnvironmentVariable {
                        var_name: var_name.to_string(),
                    }
                    .into());
                }
            }
            config
        };

        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = env(ENV_CLIENT_ID) {
            debug!("Using {} from environment", ENV_CLIENT_ID);
            self.reddit.client_id = client_id;
        }
        if let Some(client_secret) = env(ENV_CLIENT_SECRET) {
            debug!("Using {} from environment", ENV_CLIENT_SECRET);
            self.reddit.client_secret = client_secret;
        }
        if let Some(user_agent) = env(ENV_USER_AGENT) {
            debug!("Using {} from environment", ENV_USER_AGENT);
            self.reddit.user_agent = user_agent;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reddit.validate()?;
        self.fetch.validate()?;
        if let Some(name) = self.subreddits.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "subreddits".to_string(),
                value: name.clone(),
            });
        }
        Ok(())
    }
}
