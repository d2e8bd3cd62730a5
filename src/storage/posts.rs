use uuid::Uuid;

use super::schema::Database;
use super::types::{NewPost, Post, StoreError};

impl Database {
    /// Insert a post unless one with the same (feed, URL) already exists.
    ///
    /// Returns `Ok(true)` when a row was created and `Ok(false)` when the
    /// URL was already stored for this feed — a duplicate is an expected
    /// outcome of re-fetching a feed, never an error. `INSERT OR IGNORE`
    /// makes the check and the insert a single atomic statement.
    pub async fn insert_post_if_absent(&self, post: NewPost<'_>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO posts
                (id, created_at, updated_at, title, url, description, published_at, feed_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Self::now())
        .bind(Self::now())
        .bind(post.title)
        .bind(post.url)
        .bind(post.description)
        .bind(post.published_at)
        .bind(post.feed_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Recent posts from feeds the user follows, newest published first.
    /// Posts without a publish date sort last, ordered by insertion time.
    pub async fn posts_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.created_at, p.updated_at, p.title, p.url,
                   p.description, p.published_at, p.feed_id
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = ?
            ORDER BY p.published_at DESC, p.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// All posts stored for one feed, in insertion order. Used by the
    /// fetch-cycle tests to observe reconciliation results.
    pub async fn posts_for_feed(&self, feed_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, created_at, updated_at, title, url,
                   description, published_at, feed_id
            FROM posts
            WHERE feed_id = ?
            ORDER BY created_at ASC, url ASC
            "#,
        )
        .bind(feed_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
