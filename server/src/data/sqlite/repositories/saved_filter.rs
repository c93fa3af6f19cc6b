//! Saved filter repository for SQLite operations
//!
//! Stores the raw filter strings a user last applied on a dashboard, keyed
//! by filter field. Saving a blank value deletes the entry, so reopening the
//! dashboard restores exactly what the user left behind.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;

/// Saved raw inputs for a user on a dashboard, keyed by filter field id
pub async fn get_for_user(
    pool: &SqlitePool,
    user_id: &str,
    dashboard_id: &str,
) -> Result<HashMap<String, String>, SqliteError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT filter_field_id, raw_input
        FROM saved_filters
        WHERE user_id = ? AND dashboard_id = ?
        "#,
    )
    .bind(user_id)
    .bind(dashboard_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Upsert the given raw inputs; blank values delete the stored entry
pub async fn save_for_user(
    pool: &SqlitePool,
    user_id: &str,
    dashboard_id: &str,
    entries: &HashMap<String, String>,
) -> Result<(), SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;
    for (filter_field_id, raw_input) in entries {
        if raw_input.trim().is_empty() {
            sqlx::query("DELETE FROM saved_filters WHERE user_id = ? AND filter_field_id = ?")
                .bind(user_id)
                .bind(filter_field_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO saved_filters (user_id, dashboard_id, filter_field_id, raw_input, updated_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (user_id, filter_field_id)
                DO UPDATE SET raw_input = excluded.raw_input, updated_at = excluded.updated_at
                "#,
            )
            .bind(user_id)
            .bind(dashboard_id)
            .bind(filter_field_id)
            .bind(raw_input)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
    }
    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::testing::setup_pool;
    use crate::data::sqlite::repositories::{dashboard, source, user};
    use crate::domain::model::FieldType;

    async fn seed(pool: &SqlitePool) -> (String, String) {
        user::get_or_create(pool, "alice").await.unwrap();
        let source_id = source::create(
            pool,
            &source::NewSource {
                name: "ventes".into(),
                label: "Ventes".into(),
                fields: vec![],
                rows: vec![],
            },
        )
        .await
        .unwrap();
        let dashboard_id = dashboard::create(
            pool,
            &dashboard::NewDashboard {
                name: "D".into(),
                lines: vec![dashboard::NewLine {
                    name: "L".into(),
                    source_id,
                    width: None,
                    height: None,
                    settings: Default::default(),
                }],
                filter_fields: vec![dashboard::NewFilterField {
                    label: "Ville".into(),
                    field_name: "city".into(),
                    field_type: FieldType::Text,
                }],
            },
        )
        .await
        .unwrap();
        let d = dashboard::get(pool, &dashboard_id).await.unwrap().unwrap();
        (dashboard_id, d.filter_fields[0].id.clone())
    }

    #[tokio::test]
    async fn save_then_get_roundtrip() {
        let pool = setup_pool().await;
        let (dashboard_id, field_id) = seed(&pool).await;

        let entries = HashMap::from([(field_id.clone(), "par* ET >100".to_string())]);
        save_for_user(&pool, "alice", &dashboard_id, &entries).await.unwrap();

        let saved = get_for_user(&pool, "alice", &dashboard_id).await.unwrap();
        assert_eq!(saved.get(&field_id).map(String::as_str), Some("par* ET >100"));

        // another user sees nothing
        user::get_or_create(&pool, "bob").await.unwrap();
        let other = get_for_user(&pool, "bob", &dashboard_id).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn saving_overwrites_previous_value() {
        let pool = setup_pool().await;
        let (dashboard_id, field_id) = seed(&pool).await;

        for value in ["first", "second"] {
            let entries = HashMap::from([(field_id.clone(), value.to_string())]);
            save_for_user(&pool, "alice", &dashboard_id, &entries).await.unwrap();
        }

        let saved = get_for_user(&pool, "alice", &dashboard_id).await.unwrap();
        assert_eq!(saved.get(&field_id).map(String::as_str), Some("second"));
    }

    #[tokio::test]
    async fn blank_value_deletes_entry() {
        let pool = setup_pool().await;
        let (dashboard_id, field_id) = seed(&pool).await;

        let entries = HashMap::from([(field_id.clone(), "par*".to_string())]);
        save_for_user(&pool, "alice", &dashboard_id, &entries).await.unwrap();

        let entries = HashMap::from([(field_id.clone(), "   ".to_string())]);
        save_for_user(&pool, "alice", &dashboard_id, &entries).await.unwrap();

        let saved = get_for_user(&pool, "alice", &dashboard_id).await.unwrap();
        assert!(saved.is_empty());
    }
}
