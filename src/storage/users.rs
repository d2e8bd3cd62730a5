use uuid::Uuid;

use super::schema::Database;
use super::types::{StoreError, User};

impl Database {
    /// Create a user. Names are unique; registering a taken name fails.
    pub async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            created_at: Self::now(),
            updated_at: Self::now(),
            name: name.to_string(),
        };

        sqlx::query("INSERT INTO users (id, created_at, updated_at, name) VALUES (?, ?, ?, ?)")
            .bind(user.id)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(&user.name)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, name FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, name FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Delete every row in every table. Development helper behind the
    /// `reset` command; posts, follows and feeds go away with their users
    /// via ON DELETE CASCADE.
    pub async fn reset(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}
