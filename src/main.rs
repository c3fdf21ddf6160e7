use anyhow::{bail, Result};
use clap::Parser;
use reddit_client::{ForumPostFetcher, RedditClient};
use std::path::PathBuf;
use topposts_core::{
    AppConfig, ConfigError, CoreError, ErrorReporter, FetchConfig, RedditPost, TimeFilter,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "topposts")]
#[command(about = "Fetch the top posts of one or more subreddits", long_about = None)]
struct Cli {
    /// Subreddits to fetch (defaults to the configured list)
    subreddits: Vec<String>,

    /// Path to the TOML configuration file
    #[arg(short, long, env = "TOPPOSTS_CONFIG")]
    config: Option<PathBuf>,

    /// Number of posts per subreddit (1-100)
    #[arg(short = 'n', long)]
    limit: Option<u32>,

    /// Ranking window (hour, day, week, month, year, all)
    #[arg(short, long)]
    time_filter: Option<TimeFilter>,

    /// Print posts as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);
    info!("Starting topposts v{}", env!("CARGO_PKG_VERSION"));

    let reporter = ErrorReporter::new();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => bail!(reporter.report_error(&e)),
    };

    let fetch_config = config.fetch;
    let subreddits = config.subreddits;
    let client = RedditClient::new(config.reddit)?;
    let fetcher = ForumPostFetcher::with_config(client, fetch_config);

    let mut failures = Vec::new();
    let mut results = serde_json::Map::new();
    for subreddit in &subreddits {
        match fetcher.get_top_posts(subreddit).await {
            Ok(posts) => {
                if cli.json {
                    results.insert(subreddit.clone(), serde_json::to_value(&posts)?);
                } else {
                    print_posts(subreddit, fetch_config.time_filter, &posts);
                }
            }
            Err(e) => failures.push((subreddit, e)),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    if failures.is_empty() {
        return Ok(());
    }

    // A run where some subreddits came back only warns about the rest.
    let all_failed = failures.len() == subreddits.len();
    for (subreddit, e) in &failures {
        let message = if all_failed {
            reporter.report_error(e)
        } else {
            reporter.report_warning(e)
        };
        eprintln!("r/{}: {}", subreddit, message);
    }

    error!("{} of {} subreddits failed", failures.len(), subreddits.len());
    bail!("{} of {} subreddits failed", failures.len(), subreddits.len());
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "topposts={level},reddit_client={level},topposts_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig, CoreError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    apply_overrides(config, cli)
}

/// Command-line subreddits, `--limit` and `--time-filter` win over the file.
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> Result<AppConfig, CoreError> {
    if !cli.subreddits.is_empty() {
        config.subreddits = cli.subreddits.clone();
    }
    config.fetch = FetchConfig::new(
        cli.limit.unwrap_or(config.fetch.limit),
        cli.time_filter.unwrap_or(config.fetch.time_filter),
    );
    config.validate()?;

    if config.subreddits.is_empty() {
        return Err(ConfigError::MissingField {
            field: "subreddits".to_string(),
        }
        .into());
    }
    Ok(config)
}

fn print_posts(subreddit: &str, time_filter: TimeFilter, posts: &[RedditPost]) {
    println!("r/{} (top, {})", subreddit, time_filter);
    if posts.is_empty() {
        println!("  no posts");
    }
    for (rank, post) in posts.iter().enumerate() {
        let posted = post
            .created_at()
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_default();
        println!(
            "  {}. [{}] {} ({} comments, u/{}, {})",
            rank + 1,
            post.score,
            post.title,
            post.num_comments,
            post.author,
            posted
        );
        println!("     https://www.reddit.com{}", post.permalink);
    }
    println!();
}
