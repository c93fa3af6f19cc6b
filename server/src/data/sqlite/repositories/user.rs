//! User repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub display_name: Option<String>,
    pub is_manager: bool,
}

/// Fetch a user, creating it on first sight.
///
/// Bootstrap rule: the very first user of a fresh database becomes the
/// manager; everyone after that starts as a plain viewer.
pub async fn get_or_create(pool: &SqlitePool, user_id: &str) -> Result<UserRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let first_user: bool = sqlx::query_scalar("SELECT COUNT(*) = 0 FROM users")
        .fetch_one(pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO users (id, display_name, is_manager, created_at, updated_at)
        VALUES (?, NULL, ?, ?, ?)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(first_user)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let (id, display_name, is_manager): (String, Option<String>, bool) =
        sqlx::query_as("SELECT id, display_name, is_manager FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(UserRow { id, display_name, is_manager })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::testing::setup_pool;

    #[tokio::test]
    async fn first_user_becomes_manager() {
        let pool = setup_pool().await;
        let first = get_or_create(&pool, "alice").await.unwrap();
        assert!(first.is_manager);

        let second = get_or_create(&pool, "bob").await.unwrap();
        assert!(!second.is_manager);
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let pool = setup_pool().await;
        let a = get_or_create(&pool, "alice").await.unwrap();
        let b = get_or_create(&pool, "alice").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.is_manager, b.is_manager);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
