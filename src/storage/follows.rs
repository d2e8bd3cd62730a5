use uuid::Uuid;

use super::schema::Database;
use super::types::{FeedFollow, FollowedFeed, StoreError};

impl Database {
    /// Record that a user follows a feed. Following the same feed twice
    /// fails on the (user_id, feed_id) unique constraint.
    pub async fn create_follow(
        &self,
        user_id: Uuid,
        feed_id: Uuid,
    ) -> Result<FeedFollow, StoreError> {
        let follow = FeedFollow {
            id: Uuid::new_v4(),
            created_at: Self::now(),
            updated_at: Self::now(),
            user_id,
            feed_id,
        };

        sqlx::query(
            r#"
            INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(follow.id)
        .bind(follow.created_at)
        .bind(follow.updated_at)
        .bind(follow.user_id)
        .bind(follow.feed_id)
        .execute(&self.pool)
        .await?;

        Ok(follow)
    }

    /// Feeds the user follows, joined with feed names for display.
    pub async fn follows_for_user(&self, user_id: Uuid) -> Result<Vec<FollowedFeed>, StoreError> {
        let follows = sqlx::query_as::<_, FollowedFeed>(
            r#"
            SELECT f.id AS feed_id, f.name AS feed_name, f.url AS feed_url
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY f.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(follows)
    }

    /// Remove a follow. Returns whether a row was actually deleted.
    pub async fn delete_follow(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
