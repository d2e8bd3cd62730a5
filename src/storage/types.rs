use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Schema migration failed while opening the database
    #[error("database migration failed: {0}")]
    Migration(String),

    /// Any other database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// A registered user. Feeds and follows reference users by id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
    pub name: String,
}

/// A subscribed remote feed, identified by URL.
///
/// `last_fetched_at` is `None` until the scheduler fetches the feed for the
/// first time; the scheduler is the only writer of that column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feed {
    pub id: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    pub last_fetched_at: Option<i64>,
}

/// Feed joined with its owner's name, for the `feeds` listing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedOverview {
    pub name: String,
    pub url: String,
    pub owner: String,
    pub updated_at: i64,
}

/// A user-follows-feed relation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedFollow {
    pub id: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: Uuid,
    pub feed_id: Uuid,
}

/// Follow joined with the feed it points at, for the `following` listing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FollowedFeed {
    pub feed_id: Uuid,
    pub feed_name: String,
    pub feed_url: String,
}

/// A stored feed entry.
///
/// `published_at` stays `None` when the source's publish date did not parse;
/// an absent date is data, not an error.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<i64>,
    pub feed_id: Uuid,
}

/// Candidate post for insertion, before an id and timestamps are assigned.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub feed_id: Uuid,
    pub title: &'a str,
    pub url: &'a str,
    pub description: Option<&'a str>,
    pub published_at: Option<i64>,
}
