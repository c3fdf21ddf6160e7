use std::collections::HashMap;
use std::io::Write;
use topposts_core::{AppConfig, ConfigError, CoreError, TimeFilter};

const FULL_CONFIG: &str = r#"
subreddits = ["rust", "programming"]

[reddit]
client_id = "file_id"
client_secret = "file_secret"
user_agent = "topposts/0.1 by tester"

[fetch]
limit = 5
time_filter = "week"
"#;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_full_config() {
    let config = AppConfig::from_toml_str(FULL_CONFIG).unwrap();
    assert_eq!(config.reddit.client_id, "file_id");
    assert_eq!(config.reddit.user_agent, "topposts/0.1 by tester");
    assert_eq!(config.fetch.limit, 5);
    assert_eq!(config.fetch.time_filter, TimeFilter::Week);
    assert_eq!(config.subreddits, vec!["rust", "programming"]);
}

#[test]
fn test_fetch_section_defaults() {
    let config = AppConfig::from_toml_str(
        r#"
[reddit]
client_id = "id"
client_secret = "secret"
user_agent = "ua"
"#,
    )
    .unwrap();
    assert_eq!(config.fetch.limit, 3);
    assert_eq!(config.fetch.time_filter, TimeFilter::Day);
    assert!(config.subreddits.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let result = AppConfig::from_toml_str("[fetch]\nlimit = \"three\"");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_from_file() {
    let file = write_config(FULL_CONFIG);
    let config = AppConfig::load_with_env(Some(file.path()), env_from(&[])).unwrap();
    assert_eq!(config.reddit.client_secret, "file_secret");
    assert_eq!(config.fetch.limit, 5);
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config(FULL_CONFIG);
    let env = env_from(&[
        ("REDDIT_CLIENT_ID", "env_id"),
        ("REDDIT_USER_AGENT", "topposts/0.2"),
    ]);
    let config = AppConfig::load_with_env(Some(file.path()), env).unwrap();
    assert_eq!(config.reddit.client_id, "env_id");
    assert_eq!(config.reddit.client_secret, "file_secret");
    assert_eq!(config.reddit.user_agent, "topposts/0.2");
}

#[test]
fn test_explicit_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let result = AppConfig::load_with_env(Some(&path), env_from(&[]));
    assert!(matches!(
        result,
        Err(CoreError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[test]
fn test_file_missing_credential_fails_validation() {
    let file = write_config(
        r#"
[reddit]
client_id = "id"
user_agent = "ua"
"#,
    );
    let result = AppConfig::load_with_env(Some(file.path()), env_from(&[]));
    match result {
        Err(CoreError::Config(ConfigError::MissingField { field })) => {
            assert_eq!(field, "reddit.client_secret");
        }
        other => panic!("Expected MissingField error, got {:?}", other),
    }
}

#[test]
fn test_out_of_range_limit_fails_validation() {
    let file = write_config(
        r#"
[reddit]
client_id = "id"
client_secret = "secret"
user_agent = "ua"

[fetch]
limit = 0
"#,
    );
    let result = AppConfig::load_with_env(Some(file.path()), env_from(&[]));
    assert!(matches!(
        result,
        Err(CoreError::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[test]
fn test_environment_only_without_default_file() {
    let env = env_from(&[
        ("REDDIT_CLIENT_ID", "env_id"),
        ("REDDIT_CLIENT_SECRET", "env_secret"),
        ("REDDIT_USER_AGENT", "topposts/0.1"),
    ]);
    let config = AppConfig::load_with_env(None, env).unwrap();
    assert_eq!(config.reddit.client_id, "env_id");
    assert_eq!(config.fetch.limit, 3);
    assert_eq!(config.fetch.time_filter, TimeFilter::Day);
}

#[test]
fn test_environment_only_missing_variable() {
    let env = env_from(&[
        ("REDDIT_CLIENT_ID", "env_id"),
        ("REDDIT_USER_AGENT", "topposts/0.1"),
    ]);
    match AppConfig::load_with_env(None, env) {
        Err(CoreError::Config(ConfigError::MissingEnvironmentVariable { var_name })) => {
            assert_eq!(var_name, "REDDIT_CLIENT_SECRET");
        }
        other => panic!("Expected MissingEnvironmentVariable error, got {:?}", other),
    }
}
