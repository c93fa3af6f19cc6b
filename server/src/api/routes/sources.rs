//! Record source API endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::require_manager;
use crate::api::extractors::{CurrentUser, is_valid_id};
use crate::api::types::ApiError;
use crate::core::constants::MAX_RECORDS_PER_REQUEST;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::source::{self, NewSource};
use crate::domain::model::Source;

/// Shared state for Source API endpoints
#[derive(Clone)]
pub struct SourcesApiState {
    pub database: Arc<SqliteService>,
}

/// Build Source API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = SourcesApiState { database };

    Router::new()
        .route("/", get(list_sources).post(create_source))
        .route("/{source_id}", get(get_source))
        .route("/{source_id}/records", post(append_records))
        .with_state(state)
}

#[derive(Serialize, ToSchema)]
pub struct SourceSummary {
    pub id: String,
    pub name: String,
    pub label: String,
}

#[derive(Serialize, ToSchema)]
pub struct ListSourcesResponse {
    pub sources: Vec<SourceSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct CreateSourceResponse {
    pub id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AppendRecordsRequest {
    /// Records as JSON objects keyed by field name
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Serialize, ToSchema)]
pub struct AppendRecordsResponse {
    pub inserted: u64,
}

/// List record sources
#[utoipa::path(
    get,
    path = "/api/v1/sources",
    tag = "sources",
    responses(
        (status = 200, description = "All sources", body = ListSourcesResponse)
    )
)]
pub async fn list_sources(
    State(state): State<SourcesApiState>,
    _caller: CurrentUser,
) -> Result<Json<ListSourcesResponse>, ApiError> {
    let sources = source::list(state.database.pool())
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .map(|(id, name, label)| SourceSummary { id, name, label })
        .collect();

    Ok(Json(ListSourcesResponse { sources }))
}

/// Fetch a source definition with its fields
#[utoipa::path(
    get,
    path = "/api/v1/sources/{source_id}",
    tag = "sources",
    params(
        ("source_id" = String, Path, description = "Source ID")
    ),
    responses(
        (status = 200, description = "Source definition", body = Source),
        (status = 404, description = "Unknown source")
    )
)]
pub async fn get_source(
    State(state): State<SourcesApiState>,
    _caller: CurrentUser,
    Path(source_id): Path<String>,
) -> Result<Json<Source>, ApiError> {
    source::get(state.database.pool(), &source_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("SOURCE_NOT_FOUND", "Unknown source"))
}

/// Create a source with its fields and initial records (managers only)
#[utoipa::path(
    post,
    path = "/api/v1/sources",
    tag = "sources",
    request_body = NewSource,
    responses(
        (status = 201, description = "Source created", body = CreateSourceResponse),
        (status = 400, description = "Invalid definition"),
        (status = 403, description = "Caller is not a manager")
    )
)]
pub async fn create_source(
    State(state): State<SourcesApiState>,
    caller: CurrentUser,
    Json(body): Json<NewSource>,
) -> Result<(StatusCode, Json<CreateSourceResponse>), ApiError> {
    require_manager(state.database.pool(), &caller.user_id).await?;
    validate_new_source(&body)?;

    let id = source::create(state.database.pool(), &body)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok((StatusCode::CREATED, Json(CreateSourceResponse { id })))
}

/// Append records to a source (managers only)
#[utoipa::path(
    post,
    path = "/api/v1/sources/{source_id}/records",
    tag = "sources",
    request_body = AppendRecordsRequest,
    params(
        ("source_id" = String, Path, description = "Source ID")
    ),
    responses(
        (status = 200, description = "Records inserted", body = AppendRecordsResponse),
        (status = 404, description = "Unknown source"),
        (status = 403, description = "Caller is not a manager")
    )
)]
pub async fn append_records(
    State(state): State<SourcesApiState>,
    caller: CurrentUser,
    Path(source_id): Path<String>,
    Json(body): Json<AppendRecordsRequest>,
) -> Result<Json<AppendRecordsResponse>, ApiError> {
    require_manager(state.database.pool(), &caller.user_id).await?;

    if body.rows.len() > MAX_RECORDS_PER_REQUEST {
        return Err(ApiError::bad_request(
            "TOO_MANY_RECORDS",
            format!("Maximum {} records per request", MAX_RECORDS_PER_REQUEST),
        ));
    }

    if !source::exists(state.database.pool(), &source_id)
        .await
        .map_err(ApiError::from_sqlite)?
    {
        return Err(ApiError::not_found("SOURCE_NOT_FOUND", "Unknown source"));
    }

    let inserted = source::append_records(state.database.pool(), &source_id, &body.rows)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(AppendRecordsResponse { inserted }))
}

fn validate_new_source(source: &NewSource) -> Result<(), ApiError> {
    if source.name.is_empty() || source.name.len() > 100 {
        return Err(ApiError::bad_request(
            "INVALID_SOURCE_NAME",
            "Source name must be 1-100 characters",
        ));
    }
    if source.fields.is_empty() {
        return Err(ApiError::bad_request(
            "NO_FIELDS",
            "A source needs at least one field",
        ));
    }
    for field in &source.fields {
        if !is_valid_id(&field.name) {
            return Err(ApiError::bad_request(
                "INVALID_FIELD_NAME",
                format!("Invalid field name: {:?}", field.name),
            ));
        }
    }
    if source.rows.len() > MAX_RECORDS_PER_REQUEST {
        return Err(ApiError::bad_request(
            "TOO_MANY_RECORDS",
            format!("Maximum {} records per request", MAX_RECORDS_PER_REQUEST),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::source::NewField;
    use crate::domain::model::FieldType;

    fn valid_source() -> NewSource {
        NewSource {
            name: "ventes".into(),
            label: "Ventes".into(),
            fields: vec![NewField {
                name: "city".into(),
                label: "Ville".into(),
                field_type: FieldType::Text,
                digits: None,
            }],
            rows: vec![],
        }
    }

    #[test]
    fn validation_accepts_well_formed_source() {
        assert!(validate_new_source(&valid_source()).is_ok());
    }

    #[test]
    fn validation_rejects_bad_names() {
        let mut s = valid_source();
        s.name = String::new();
        assert!(validate_new_source(&s).is_err());

        let mut s = valid_source();
        s.fields[0].name = "not a field name".into();
        assert!(validate_new_source(&s).is_err());
    }

    #[test]
    fn validation_rejects_empty_field_list() {
        let mut s = valid_source();
        s.fields.clear();
        assert!(validate_new_source(&s).is_err());
    }
}
