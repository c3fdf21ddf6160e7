use topposts_core::{ConfigError, CoreError, ErrorExt, ErrorReporter, RedditApiError};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "reddit.client_id".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let request_error = CoreError::RequestFailed {
        message: "teapot".to_string(),
        status_code: Some(418),
    };
    assert_eq!(request_error.error_code(), "REQUEST_FAILED");
}

#[test]
fn test_reddit_error_codes() {
    assert_eq!(
        RedditApiError::SubredditNotFound {
            subreddit: "nope".to_string()
        }
        .error_code(),
        "REDDIT_SUBREDDIT_NOT_FOUND"
    );
    assert_eq!(
        RedditApiError::RateLimitExceeded { retry_after: 60 }.error_code(),
        "REDDIT_RATE_LIMIT"
    );
    assert_eq!(
        RedditApiError::AuthenticationFailed {
            reason: "401".to_string()
        }
        .error_code(),
        "REDDIT_AUTH_FAILED"
    );
}

#[test]
fn test_auth_failure_classification() {
    assert!(RedditApiError::InvalidToken.is_auth_failure());
    assert!(RedditApiError::AuthenticationFailed {
        reason: "bad secret".to_string()
    }
    .is_auth_failure());
    assert!(!RedditApiError::RequestTimeout.is_auth_failure());
    assert!(!RedditApiError::SubredditNotFound {
        subreddit: "nope".to_string()
    }
    .is_auth_failure());
}

#[test]
fn test_user_friendly_messages() {
    let not_found = CoreError::RedditApi(RedditApiError::SubredditNotFound {
        subreddit: "doesnotexist".to_string(),
    });
    let message = not_found.user_friendly_message();
    assert!(message.contains("doesnotexist"));

    let rate_limited = CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 42 });
    assert!(rate_limited.user_friendly_message().contains("42 seconds"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_ID".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("REDDIT_CLIENT_ID"));
}

#[test]
fn test_error_display() {
    let error = CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 });
    assert_eq!(error.to_string(), "Reddit API error: Server error: 503");

    let error = CoreError::from(ConfigError::InvalidValue {
        field: "fetch.limit".to_string(),
        value: "0".to_string(),
    });
    assert_eq!(
        error.to_string(),
        "Configuration error: Invalid value for fetch.limit: 0"
    );
}

#[test]
fn test_missing_config_file_message_names_only_the_file() {
    let error = CoreError::Config(ConfigError::FileNotFound {
        path: "/etc/topposts.toml".to_string(),
    });
    assert_eq!(
        error.user_friendly_message(),
        "Configuration file '/etc/topposts.toml' not found."
    );
    assert!(!error.user_friendly_message().contains("environment"));
}

#[test]
fn test_error_reporter_returns_user_message() {
    let reporter = ErrorReporter::new();
    let error = CoreError::RedditApi(RedditApiError::SubredditNotFound {
        subreddit: "nope".to_string(),
    });

    assert_eq!(
        reporter.report_error(&error),
        "Subreddit 'nope' not found or is banned."
    );
    assert_eq!(reporter.report_warning(&error), error.user_friendly_message());

    let rate_limited = CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 9 });
    assert!(ErrorReporter::default()
        .report_warning(&rate_limited)
        .contains("9 seconds"));
}
