//! Dashboard repository for SQLite operations

use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::core::constants::{DEFAULT_LINE_HEIGHT, DEFAULT_LINE_WIDTH};
use crate::data::sqlite::SqliteError;
use crate::domain::model::{Dashboard, DashboardLine, FieldType, FilterField, LineSettings};

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewLine {
    pub name: String,
    pub source_id: String,
    pub width: Option<u8>,
    pub height: Option<u16>,
    pub settings: LineSettings,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewFilterField {
    pub label: String,
    pub field_name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewDashboard {
    pub name: String,
    pub lines: Vec<NewLine>,
    #[serde(default)]
    pub filter_fields: Vec<NewFilterField>,
}

/// Create a dashboard with its lines and filter fields. Returns the new id.
pub async fn create(pool: &SqlitePool, dashboard: &NewDashboard) -> Result<String, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO dashboards (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&dashboard.name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    for (position, line) in dashboard.lines.iter().enumerate() {
        let settings = serde_json::to_string(&line.settings)
            .map_err(|e| SqliteError::InvalidData(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO dashboard_lines (id, dashboard_id, source_id, name, width, height, position, settings)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(cuid2::create_id())
        .bind(&id)
        .bind(&line.source_id)
        .bind(&line.name)
        .bind(line.width.unwrap_or(DEFAULT_LINE_WIDTH))
        .bind(line.height.unwrap_or(DEFAULT_LINE_HEIGHT) as i64)
        .bind(position as i64)
        .bind(settings)
        .execute(&mut *tx)
        .await?;
    }

    for (position, field) in dashboard.filter_fields.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO filter_fields (id, dashboard_id, label, field_name, field_type, position)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(cuid2::create_id())
        .bind(&id)
        .bind(&field.label)
        .bind(&field.field_name)
        .bind(field.field_type.as_str())
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// List dashboards as (id, name)
pub async fn list(pool: &SqlitePool) -> Result<Vec<(String, String)>, SqliteError> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, name FROM dashboards ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Load a full dashboard definition (lines + filter fields)
pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Dashboard>, SqliteError> {
    let Some((id, name)): Option<(String, String)> =
        sqlx::query_as("SELECT id, name FROM dashboards WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let line_rows: Vec<(String, String, String, i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT id, source_id, name, width, height, settings
        FROM dashboard_lines
        WHERE dashboard_id = ?
        ORDER BY position
        "#,
    )
    .bind(&id)
    .fetch_all(pool)
    .await?;

    let lines = line_rows
        .into_iter()
        .map(|(line_id, source_id, line_name, width, height, settings)| DashboardLine {
            id: line_id,
            name: line_name,
            source_id,
            width: width as u8,
            height: height as u16,
            settings: parse_settings(&settings),
        })
        .collect();

    let field_rows: Vec<(String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT id, label, field_name, field_type
        FROM filter_fields
        WHERE dashboard_id = ?
        ORDER BY position
        "#,
    )
    .bind(&id)
    .fetch_all(pool)
    .await?;

    let filter_fields = field_rows
        .into_iter()
        .map(|(field_id, label, field_name, field_type)| FilterField {
            id: field_id,
            label,
            field_name,
            field_type: FieldType::parse(&field_type),
        })
        .collect();

    Ok(Some(Dashboard { id, name, lines, filter_fields }))
}

/// Stored settings survive schema drift: unknown JSON falls back to defaults
/// instead of failing the read.
fn parse_settings(raw: &str) -> LineSettings {
    match serde_json::from_str(raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable line settings, using defaults");
            LineSettings::default()
        }
    }
}
