//! Command-line surface: one subcommand per user-facing operation, all
//! dispatched over shared `State`.
//!
//! Commands that act on behalf of a user ([`require_user`]) need a current
//! user in the config file, set by `register` or `login`. Every handler
//! prints its result to stdout and bubbles errors up to `main`, which
//! turns them into a non-zero exit.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::feed;
use crate::scheduler::{parse_interval, Scheduler};
use crate::storage::{Database, User};

#[derive(Parser, Debug)]
#[command(name = "graze", about = "Multi-user command-line RSS aggregator", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new user and log in as them
    Register { name: String },
    /// Switch the current user
    Login { name: String },
    /// List registered users
    Users,
    /// Delete all stored users, feeds and posts
    Reset,
    /// Add a feed owned by the current user and follow it
    #[command(name = "addfeed")]
    AddFeed { name: String, url: String },
    /// List all feeds with their owners
    Feeds,
    /// Follow an existing feed by URL
    Follow { url: String },
    /// List feeds the current user follows
    Following,
    /// Stop following a feed
    Unfollow { url: String },
    /// Show recent posts from followed feeds
    Browse { limit: Option<i64> },
    /// Run the fetch loop, polling one feed per interval (e.g. "1m", "30s")
    Agg { interval: String },
}

struct State {
    db: Database,
    config: Config,
    config_path: PathBuf,
}

/// Parse arguments, set up config and database, and dispatch.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = config_dir()?;
    std::fs::create_dir_all(&config_dir).context("failed to create config directory")?;

    let config_path = config_dir.join("config.toml");
    let config = Config::load(&config_path)?;

    let db_path = config.database_path(&config_dir);
    let db_path = db_path
        .to_str()
        .context("invalid UTF-8 in database path")?
        .to_string();
    let db = Database::open(&db_path)
        .await
        .context("failed to open database")?;

    let mut state = State {
        db,
        config,
        config_path,
    };

    match cli.command {
        Command::Register { name } => register(&mut state, &name).await,
        Command::Login { name } => login(&mut state, &name).await,
        Command::Users => users(&state).await,
        Command::Reset => reset(&state).await,
        Command::AddFeed { name, url } => add_feed(&state, &name, &url).await,
        Command::Feeds => feeds(&state).await,
        Command::Follow { url } => follow(&state, &url).await,
        Command::Following => following(&state).await,
        Command::Unfollow { url } => unfollow(&state, &url).await,
        Command::Browse { limit } => browse(&state, limit).await,
        Command::Agg { interval } => agg(&state, &interval).await,
    }
}

/// Config directory: ~/.config/graze/
fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("graze"))
}

/// Look up the user the config says is logged in. Commands that create
/// follows or browse posts act on this user's behalf.
async fn require_user(state: &State) -> Result<User> {
    let name = state.config.current_user.as_deref().context(
        "no user is logged in (run `graze register <name>` or `graze login <name>` first)",
    )?;
    state
        .db
        .user_by_name(name)
        .await?
        .with_context(|| format!("current user {name:?} no longer exists"))
}

async fn register(state: &mut State, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("username cannot be empty");
    }

    let user = state
        .db
        .create_user(name)
        .await
        .with_context(|| format!("failed to create user {name:?}"))?;

    state.config.current_user = Some(user.name.clone());
    state.config.save(&state.config_path)?;

    println!("User {} created (id {})", user.name, user.id);
    Ok(())
}

async fn login(state: &mut State, name: &str) -> Result<()> {
    let user = state
        .db
        .user_by_name(name)
        .await?
        .with_context(|| format!("unknown user {name:?}"))?;

    if state.config.current_user.as_deref() == Some(user.name.as_str()) {
        println!("User {} is already logged in", user.name);
        return Ok(());
    }

    state.config.current_user = Some(user.name.clone());
    state.config.save(&state.config_path)?;

    println!("Logged in as {}", user.name);
    Ok(())
}

async fn users(state: &State) -> Result<()> {
    for user in state.db.users().await? {
        if state.config.current_user.as_deref() == Some(user.name.as_str()) {
            println!("{} (current)", user.name);
        } else {
            println!("{}", user.name);
        }
    }
    Ok(())
}

async fn reset(state: &State) -> Result<()> {
    state.db.reset().await?;
    println!("All data removed");
    Ok(())
}

async fn add_feed(state: &State, name: &str, url: &str) -> Result<()> {
    if name.trim().is_empty() || url.trim().is_empty() {
        bail!("feed name and URL cannot be empty");
    }

    let user = require_user(state).await?;
    let feed = state
        .db
        .create_feed(name, url, user.id)
        .await
        .with_context(|| format!("failed to create feed {url:?}"))?;
    state
        .db
        .create_follow(user.id, feed.id)
        .await
        .context("failed to follow the new feed")?;

    println!("Feed {} added; {} now follows it", feed.name, user.name);
    Ok(())
}

async fn feeds(state: &State) -> Result<()> {
    let overviews = state.db.feed_overviews().await?;
    if overviews.is_empty() {
        println!("No feeds found");
        return Ok(());
    }

    for feed in &overviews {
        println!("{} <{}> added by {}", feed.name, feed.url, feed.owner);
    }
    println!("Total feeds: {}", overviews.len());
    Ok(())
}

async fn follow(state: &State, url: &str) -> Result<()> {
    let user = require_user(state).await?;
    let feed = state
        .db
        .feed_by_url(url)
        .await?
        .with_context(|| format!("no feed with URL {url:?}"))?;

    state
        .db
        .create_follow(user.id, feed.id)
        .await
        .with_context(|| format!("failed to follow {}", feed.name))?;

    println!("{} now follows {}", user.name, feed.name);
    Ok(())
}

async fn following(state: &State) -> Result<()> {
    let user = require_user(state).await?;
    let follows = state.db.follows_for_user(user.id).await?;

    if follows.is_empty() {
        println!("You are not following any feeds");
        return Ok(());
    }
    for followed in follows {
        println!("{} <{}>", followed.feed_name, followed.feed_url);
    }
    Ok(())
}

async fn unfollow(state: &State, url: &str) -> Result<()> {
    let user = require_user(state).await?;
    let feed = state
        .db
        .feed_by_url(url)
        .await?
        .with_context(|| format!("no feed with URL {url:?}"))?;

    if !state.db.delete_follow(user.id, feed.id).await? {
        bail!("you were not following {}", feed.name);
    }

    println!("{} unfollowed {}", user.name, feed.name);
    Ok(())
}

async fn browse(state: &State, limit: Option<i64>) -> Result<()> {
    let user = require_user(state).await?;
    let limit = limit.unwrap_or(state.config.default_browse_limit);
    if limit <= 0 {
        bail!("limit must be positive");
    }

    let posts = state.db.posts_for_user(user.id, limit).await?;
    if posts.is_empty() {
        println!("No posts found");
        return Ok(());
    }

    for post in posts {
        let published = post
            .published_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!("{} (published {})", post.title, published);
        println!("  {}", post.url);
        if let Some(description) = &post.description {
            println!("  {}", description);
        }
    }
    Ok(())
}

async fn agg(state: &State, interval: &str) -> Result<()> {
    // Interval and client problems must surface before any fetch happens
    let interval = parse_interval(interval)?;
    let client = feed::client(Duration::from_secs(state.config.fetch_timeout_secs))
        .context("failed to build HTTP client")?;

    let scheduler = Scheduler::new(state.db.clone(), client);
    scheduler.run(interval).await?;
    Ok(())
}
