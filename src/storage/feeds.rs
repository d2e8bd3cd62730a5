use uuid::Uuid;

use super::schema::Database;
use super::types::{Feed, FeedOverview, StoreError};

const FEED_COLUMNS: &str = "id, created_at, updated_at, name, url, user_id, last_fetched_at";

impl Database {
    /// Create a feed owned by `user_id`. URLs are unique across all feeds.
    pub async fn create_feed(
        &self,
        name: &str,
        url: &str,
        user_id: Uuid,
    ) -> Result<Feed, StoreError> {
        let feed = Feed {
            id: Uuid::new_v4(),
            created_at: Self::now(),
            updated_at: Self::now(),
            name: name.to_string(),
            url: url.to_string(),
            user_id,
            last_fetched_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO feeds (id, created_at, updated_at, name, url, user_id, last_fetched_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(feed.id)
        .bind(feed.created_at)
        .bind(feed.updated_at)
        .bind(&feed.name)
        .bind(&feed.url)
        .bind(feed.user_id)
        .execute(&self.pool)
        .await?;

        Ok(feed)
    }

    pub async fn feeds(&self) -> Result<Vec<Feed>, StoreError> {
        let query = format!("SELECT {FEED_COLUMNS} FROM feeds ORDER BY name");
        let feeds = sqlx::query_as::<_, Feed>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(feeds)
    }

    /// All feeds joined with their owners' names, for the `feeds` listing.
    pub async fn feed_overviews(&self) -> Result<Vec<FeedOverview>, StoreError> {
        let overviews = sqlx::query_as::<_, FeedOverview>(
            r#"
            SELECT f.name, f.url, u.name AS owner, f.updated_at
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(overviews)
    }

    pub async fn feed_by_url(&self, url: &str) -> Result<Option<Feed>, StoreError> {
        let query = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?");
        let feed = sqlx::query_as::<_, Feed>(&query)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(feed)
    }

    /// The feed the scheduler should fetch next: oldest `last_fetched_at`
    /// first, with never-fetched feeds (NULL, which SQLite sorts before any
    /// value in ascending order) ahead of all others. `created_at, id`
    /// breaks ties deterministically. Returns `None` when no feeds exist.
    pub async fn next_feed_to_fetch(&self) -> Result<Option<Feed>, StoreError> {
        let query = format!(
            "SELECT {FEED_COLUMNS} FROM feeds \
             ORDER BY last_fetched_at ASC, created_at ASC, id ASC LIMIT 1"
        );
        let feed = sqlx::query_as::<_, Feed>(&query)
            .fetch_optional(&self.pool)
            .await?;

        Ok(feed)
    }

    /// Stamp a feed's `last_fetched_at` to now, rotating it to the back of
    /// the fetch order.
    pub async fn mark_feed_fetched(&self, feed_id: Uuid) -> Result<(), StoreError> {
        let now = Self::now();
        sqlx::query("UPDATE feeds SET last_fetched_at = ?, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(now)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    async fn set_last_fetched(db: &Database, feed_id: Uuid, value: Option<i64>) {
        sqlx::query("UPDATE feeds SET last_fetched_at = ? WHERE id = ?")
            .bind(value)
            .bind(feed_id)
            .execute(&db.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_url_rejected() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();

        db.create_feed("One", "https://example.com/rss", user.id)
            .await
            .unwrap();
        let result = db.create_feed("Two", "https://example.com/rss", user.id).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_feed_by_url() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();
        let created = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();

        let found = db
            .feed_by_url("https://example.com/rss")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert!(db.feed_by_url("https://other.example").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_feed_empty_store() {
        let db = test_db().await;
        assert!(db.next_feed_to_fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_never_fetched_selected_before_fetched() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();
        let fetched = db
            .create_feed("Fetched", "https://a.example/rss", user.id)
            .await
            .unwrap();
        let fresh = db
            .create_feed("Fresh", "https://b.example/rss", user.id)
            .await
            .unwrap();

        // One feed fetched an hour ago, the other never
        set_last_fetched(&db, fetched.id, Some(Database::now() - 3600)).await;

        let next = db.next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(next.id, fresh.id);
    }

    #[tokio::test]
    async fn test_oldest_timestamp_selected_first() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();
        let older = db
            .create_feed("Older", "https://a.example/rss", user.id)
            .await
            .unwrap();
        let newer = db
            .create_feed("Newer", "https://b.example/rss", user.id)
            .await
            .unwrap();

        let now = Database::now();
        set_last_fetched(&db, older.id, Some(now - 7200)).await;
        set_last_fetched(&db, newer.id, Some(now - 60)).await;

        let next = db.next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(next.id, older.id);
    }

    #[tokio::test]
    async fn test_tied_timestamps_select_deterministically() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();
        let a = db
            .create_feed("A", "https://a.example/rss", user.id)
            .await
            .unwrap();
        let b = db
            .create_feed("B", "https://b.example/rss", user.id)
            .await
            .unwrap();

        let stamp = Database::now() - 600;
        set_last_fetched(&db, a.id, Some(stamp)).await;
        set_last_fetched(&db, b.id, Some(stamp)).await;

        let first = db.next_feed_to_fetch().await.unwrap().unwrap();
        let second = db.next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_mark_feed_fetched_rotates_to_back() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();
        let a = db
            .create_feed("A", "https://a.example/rss", user.id)
            .await
            .unwrap();
        let b = db
            .create_feed("B", "https://b.example/rss", user.id)
            .await
            .unwrap();

        let first = db.next_feed_to_fetch().await.unwrap().unwrap();
        db.mark_feed_fetched(first.id).await.unwrap();

        let second = db.next_feed_to_fetch().await.unwrap().unwrap();
        assert_ne!(first.id, second.id);
        assert!([a.id, b.id].contains(&second.id));

        let stamped = db.feed_by_url(&first.url).await.unwrap().unwrap();
        assert!(stamped.last_fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_feed_overviews_include_owner() {
        let db = test_db().await;
        let user = db.create_user("ada").await.unwrap();
        db.create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();

        let overviews = db.feed_overviews().await.unwrap();
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].name, "Blog");
        assert_eq!(overviews[0].owner, "ada");
    }
}
