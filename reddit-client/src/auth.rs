//! App-only OAuth2 authentication against Reddit.
//!
//! Reddit's client-credentials grant exchanges the application's id and
//! secret (sent as HTTP basic auth) for a bearer token with no user context.
//! A fresh token is requested every time [`RedditAuthenticator::authenticate`]
//! is called; nothing is cached.

use crate::DEFAULT_REQUEST_TIMEOUT;
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    TokenResponse, TokenUrl,
};
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use topposts_core::{CoreError, RedditApiError, RedditCredentials};
use tracing::{debug, error, info};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

// Reddit documents app-only tokens as valid for one day.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

#[derive(Debug)]
pub struct RedditAuthenticator {
    oauth_client: BasicClient,
    http_client: reqwest::Client,
}

impl RedditAuthenticator {
    pub fn new(credentials: &RedditCredentials) -> Result<Self, CoreError> {
        Self::with_token_url(credentials, REDDIT_TOKEN_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_token_url(
        credentials: &RedditCredentials,
        token_url: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let auth_url =
            AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| CoreError::InvalidInput {
                message: format!("Invalid authorization URL: {}", e),
            })?;
        let token_url = TokenUrl::new(token_url.to_string()).map_err(|e| CoreError::InvalidInput {
            message: format!("Invalid token URL: {}", e),
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::BasicAuth);

        // Token requests never follow redirects.
        let http_client = reqwest::Client::builder()
            .user_agent(&credentials.user_agent)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            oauth_client,
            http_client,
        })
    }

    pub async fn authenticate(&self) -> Result<RedditToken, CoreError> {
        info!("Requesting app-only access token from Reddit");
        let http_client = self.http_client.clone();

        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(move |request| send_token_request(http_client, request))
            .await
            .map_err(map_token_error)?;

        let expires_at = SystemTime::now()
            + response
                .expires_in()
                .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        debug!("Access token granted with scope {:?}", scope);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at,
            scope,
        })
    }
}

async fn send_token_request(
    client: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let mut request_builder = client
        .request(request.method, request.url.as_str())
        .body(request.body);
    for (name, value) in &request.headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = request_builder.send().await?;
    let status_code = response.status();
    let headers = response.headers().to_owned();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn map_token_error(err: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> CoreError {
    match err {
        RequestTokenError::ServerResponse(response) => {
            error!("Token request rejected: {}", response);
            RedditApiError::AuthenticationFailed {
                reason: response.to_string(),
            }
            .into()
        }
        RequestTokenError::Request(e) => {
            error!("Network error during token request: {}", e);
            if e.is_timeout() {
                RedditApiError::RequestTimeout.into()
            } else {
                CoreError::Network(e)
            }
        }
        RequestTokenError::Parse(e, body) => {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!("Unexpected token response ({}): {}", e, body);
            RedditApiError::AuthenticationFailed { reason: body }.into()
        }
        RequestTokenError::Other(reason) => {
            error!("Token request failed: {}", reason);
            RedditApiError::AuthenticationFailed { reason }.into()
        }
    }
}
