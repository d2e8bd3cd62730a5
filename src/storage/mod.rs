//! SQLite-backed persistent store.
//!
//! `Database` wraps a connection pool; the operations are grouped by
//! concern (`users`, `feeds`, `follows`, `posts`) in separate impl blocks.
//! Every operation is a single statement or transaction, so concurrent CLI
//! invocations against the same file rely only on SQLite's own isolation.

mod feeds;
mod follows;
mod posts;
mod schema;
mod types;
mod users;

pub use schema::Database;
pub use types::{Feed, FeedFollow, FeedOverview, FollowedFeed, NewPost, Post, StoreError, User};
