//! Record source repository for SQLite operations
//!
//! Sources are named datasets with typed field definitions; record values
//! are stored as a JSON object per row, keyed by field name, and coerced to
//! their declared type when loaded.

use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::data::sqlite::SqliteError;
use crate::domain::model::{FieldDef, FieldType, FieldValue, Record, Source};

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub digits: Option<u8>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewSource {
    pub name: String,
    pub label: String,
    pub fields: Vec<NewField>,
    /// Initial records, one JSON object per row keyed by field name
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Create a source with its fields and initial records. Returns the new id.
pub async fn create(pool: &SqlitePool, source: &NewSource) -> Result<String, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO sources (id, name, label, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&source.name)
    .bind(&source.label)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for (position, field) in source.fields.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO source_fields (source_id, name, label, field_type, digits, position)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&field.name)
        .bind(&field.label)
        .bind(field.field_type.as_str())
        .bind(field.digits)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    for row in &source.rows {
        let data = serde_json::Value::Object(row.clone()).to_string();
        sqlx::query("INSERT INTO records (source_id, data, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(data)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(id)
}

pub async fn exists(pool: &SqlitePool, source_id: &str) -> Result<bool, SqliteError> {
    let found: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM sources WHERE id = ?")
        .bind(source_id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

/// Load a source with its field definitions
pub async fn get(pool: &SqlitePool, source_id: &str) -> Result<Option<Source>, SqliteError> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, name, label FROM sources WHERE id = ?")
            .bind(source_id)
            .fetch_optional(pool)
            .await?;

    let Some((id, name, label)) = row else {
        return Ok(None);
    };
    let fields = get_fields(pool, &id).await?;
    Ok(Some(Source { id, name, label, fields }))
}

/// List sources as (id, name, label)
pub async fn list(pool: &SqlitePool) -> Result<Vec<(String, String, String)>, SqliteError> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, name, label FROM sources ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Field definitions of a source, in declared order
pub async fn get_fields(pool: &SqlitePool, source_id: &str) -> Result<Vec<FieldDef>, SqliteError> {
    let rows: Vec<(String, String, String, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT name, label, field_type, digits
        FROM source_fields
        WHERE source_id = ?
        ORDER BY position
        "#,
    )
    .bind(source_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(name, label, field_type, digits)| FieldDef {
            name,
            label,
            field_type: FieldType::parse(&field_type),
            digits: digits.map(|d| d as u8),
        })
        .collect())
}

/// Append records to an existing source. Returns the number inserted.
pub async fn append_records(
    pool: &SqlitePool,
    source_id: &str,
    rows: &[serde_json::Map<String, serde_json::Value>],
) -> Result<u64, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;
    for row in rows {
        let data = serde_json::Value::Object(row.clone()).to_string();
        sqlx::query("INSERT INTO records (source_id, data, created_at) VALUES (?, ?, ?)")
            .bind(source_id)
            .bind(data)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(rows.len() as u64)
}

/// Load all records of a source with values coerced to their field types.
/// Rows with corrupt JSON are skipped with a warning rather than failing the
/// whole query.
pub async fn load_records(
    pool: &SqlitePool,
    source_id: &str,
    fields: &[FieldDef],
) -> Result<Vec<Record>, SqliteError> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, data FROM records WHERE source_id = ? ORDER BY id")
            .bind(source_id)
            .fetch_all(pool)
            .await?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_id, data) in rows {
        let parsed: serde_json::Value = match serde_json::from_str(&data) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(record_id = row_id, error = %e, "Skipping corrupt record");
                continue;
            }
        };
        let object = parsed.as_object().cloned().unwrap_or_default();
        let values = fields
            .iter()
            .map(|f| {
                let value = object.get(&f.name).unwrap_or(&serde_json::Value::Null);
                (f.name.clone(), FieldValue::from_json(f.field_type, value))
            })
            .collect();
        records.push(Record::new(values));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::testing::setup_pool;

    fn sample_source() -> NewSource {
        let rows = vec![
            serde_json::json!({"city": "Paris", "amount": 100.5, "when": "2024-01-10"}),
            serde_json::json!({"city": "Lyon", "amount": 25, "when": "2024-03-02"}),
            serde_json::json!({"city": null, "amount": "not a number"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        NewSource {
            name: "ventes".into(),
            label: "Ventes".into(),
            fields: vec![
                NewField {
                    name: "city".into(),
                    label: "Ville".into(),
                    field_type: FieldType::Text,
                    digits: None,
                },
                NewField {
                    name: "amount".into(),
                    label: "Montant".into(),
                    field_type: FieldType::Numeric,
                    digits: Some(2),
                },
                NewField {
                    name: "when".into(),
                    label: "Date".into(),
                    field_type: FieldType::Date,
                    digits: None,
                },
            ],
            rows,
        }
    }

    #[tokio::test]
    async fn create_then_load_roundtrip() {
        let pool = setup_pool().await;
        let id = create(&pool, &sample_source()).await.unwrap();
        assert!(exists(&pool, &id).await.unwrap());

        let fields = get_fields(&pool, &id).await.unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "city");
        assert_eq!(fields[1].field_type, FieldType::Numeric);
        assert_eq!(fields[1].digits, Some(2));

        let records = load_records(&pool, &id, &fields).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value("city"), &FieldValue::Text("Paris".into()));
        assert_eq!(records[0].value("amount"), &FieldValue::Number(100.5));
        // string numeric coerces, bad values fall to Null
        assert_eq!(records[1].value("amount"), &FieldValue::Number(25.0));
        assert!(records[2].value("city").is_null());
        assert!(records[2].value("amount").is_null());
        assert!(records[2].value("when").is_null());
    }

    #[tokio::test]
    async fn get_returns_source_with_fields() {
        let pool = setup_pool().await;
        let id = create(&pool, &sample_source()).await.unwrap();

        let loaded = get(&pool, &id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "ventes");
        assert_eq!(loaded.fields.len(), 3);

        assert!(get(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn append_records_adds_rows() {
        let pool = setup_pool().await;
        let id = create(&pool, &sample_source()).await.unwrap();
        let fields = get_fields(&pool, &id).await.unwrap();

        let extra = vec![
            serde_json::json!({"city": "Nice", "amount": 7})
                .as_object()
                .unwrap()
                .clone(),
        ];
        let inserted = append_records(&pool, &id, &extra).await.unwrap();
        assert_eq!(inserted, 1);

        let records = load_records(&pool, &id, &fields).await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn corrupt_record_is_skipped() {
        let pool = setup_pool().await;
        let id = create(&pool, &sample_source()).await.unwrap();
        sqlx::query("INSERT INTO records (source_id, data, created_at) VALUES (?, 'not json', 0)")
            .bind(&id)
            .execute(&pool)
            .await
            .unwrap();

        let fields = get_fields(&pool, &id).await.unwrap();
        let records = load_records(&pool, &id, &fields).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let pool = setup_pool().await;
        let mut a = sample_source();
        a.name = "zz".into();
        create(&pool, &a).await.unwrap();
        let mut b = sample_source();
        b.name = "aa".into();
        create(&pool, &b).await.unwrap();

        let all = list(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].1, "aa");
    }
}
