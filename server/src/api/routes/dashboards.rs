//! Dashboard API endpoints
//!
//! Dashboard definitions, per-user saved filters and widget data payloads.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::require_manager;
use crate::api::extractors::{CurrentUser, ValidatedJson, is_valid_id};
use crate::api::types::ApiError;
use crate::core::constants::MAX_FILTER_INPUT_LEN;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::dashboard::{self, NewDashboard};
use crate::data::sqlite::repositories::{saved_filter, source, user};
use crate::domain::filter::FilterSet;
use crate::domain::model::{Dashboard, LineOverrides, Record};
use crate::domain::widgets::{self, WidgetPayload};

/// Shared state for Dashboard API endpoints
#[derive(Clone)]
pub struct DashboardsApiState {
    pub database: Arc<SqliteService>,
}

/// Build Dashboard API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = DashboardsApiState { database };

    Router::new()
        .route("/", get(list_dashboards).post(create_dashboard))
        .route("/{dashboard_id}", get(get_dashboard))
        .route("/{dashboard_id}/filters", get(get_saved_filters).put(save_filters))
        .route("/{dashboard_id}/lines/{line_id}/data", post(line_data))
        .with_state(state)
}

#[derive(Serialize, ToSchema)]
pub struct DashboardSummary {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ListDashboardsResponse {
    pub dashboards: Vec<DashboardSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct CreateDashboardResponse {
    pub id: String,
}

#[derive(Serialize, ToSchema)]
pub struct SavedFiltersResponse {
    /// Raw input strings keyed by filter field id
    pub filters: HashMap<String, String>,
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct SaveFiltersRequest {
    /// Raw input strings keyed by filter field id; blank values delete
    #[validate(custom(function = "validate_filter_inputs"))]
    pub filters: HashMap<String, String>,
}

#[derive(Serialize, ToSchema)]
pub struct SaveFiltersResponse {
    /// Entries actually written (unknown filter field ids are ignored)
    pub saved: usize,
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct LineDataRequest {
    /// Current raw filter inputs keyed by filter field id
    #[serde(default)]
    #[validate(custom(function = "validate_filter_inputs"))]
    pub filters: HashMap<String, String>,
    /// Per-request render setting overrides, not persisted
    #[serde(default)]
    pub overrides: LineOverrides,
}

#[derive(Serialize, ToSchema)]
pub struct LineDataResponse {
    pub payload: WidgetPayload,
    /// Filter terms that matched no recognized grammar and were ignored
    pub dropped_terms: Vec<String>,
}

/// Shared validation for raw filter input maps
fn validate_filter_inputs(filters: &HashMap<String, String>) -> Result<(), ValidationError> {
    for (field_id, raw) in filters {
        if !is_valid_id(field_id) {
            return Err(ValidationError::new("filter_field_id")
                .with_message("Filter field ids must be 1-64 alphanumeric characters".into()));
        }
        if raw.len() > MAX_FILTER_INPUT_LEN {
            return Err(ValidationError::new("filter_input_len").with_message(
                format!("Filter input must be at most {} characters", MAX_FILTER_INPUT_LEN).into(),
            ));
        }
    }
    Ok(())
}

async fn load_dashboard(
    state: &DashboardsApiState,
    dashboard_id: &str,
) -> Result<Dashboard, ApiError> {
    dashboard::get(state.database.pool(), dashboard_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("DASHBOARD_NOT_FOUND", "Unknown dashboard"))
}

/// List dashboards
#[utoipa::path(
    get,
    path = "/api/v1/dashboards",
    tag = "dashboards",
    responses(
        (status = 200, description = "All dashboards", body = ListDashboardsResponse)
    )
)]
pub async fn list_dashboards(
    State(state): State<DashboardsApiState>,
    _caller: CurrentUser,
) -> Result<Json<ListDashboardsResponse>, ApiError> {
    let dashboards = dashboard::list(state.database.pool())
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .map(|(id, name)| DashboardSummary { id, name })
        .collect();

    Ok(Json(ListDashboardsResponse { dashboards }))
}

/// Create a dashboard with its lines and filter fields (managers only)
#[utoipa::path(
    post,
    path = "/api/v1/dashboards",
    tag = "dashboards",
    request_body = NewDashboard,
    responses(
        (status = 201, description = "Dashboard created", body = CreateDashboardResponse),
        (status = 400, description = "Invalid definition"),
        (status = 403, description = "Caller is not a manager")
    )
)]
pub async fn create_dashboard(
    State(state): State<DashboardsApiState>,
    caller: CurrentUser,
    Json(body): Json<NewDashboard>,
) -> Result<(StatusCode, Json<CreateDashboardResponse>), ApiError> {
    require_manager(state.database.pool(), &caller.user_id).await?;

    if body.name.is_empty() || body.name.len() > 100 {
        return Err(ApiError::bad_request(
            "INVALID_DASHBOARD_NAME",
            "Dashboard name must be 1-100 characters",
        ));
    }
    for line in &body.lines {
        if !source::exists(state.database.pool(), &line.source_id)
            .await
            .map_err(ApiError::from_sqlite)?
        {
            return Err(ApiError::bad_request(
                "UNKNOWN_SOURCE",
                format!("Line {:?} references an unknown source", line.name),
            ));
        }
    }

    let id = dashboard::create(state.database.pool(), &body)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok((StatusCode::CREATED, Json(CreateDashboardResponse { id })))
}

/// Fetch a dashboard definition (lines and filter fields)
#[utoipa::path(
    get,
    path = "/api/v1/dashboards/{dashboard_id}",
    tag = "dashboards",
    params(
        ("dashboard_id" = String, Path, description = "Dashboard ID")
    ),
    responses(
        (status = 200, description = "Dashboard definition", body = Dashboard),
        (status = 404, description = "Unknown dashboard")
    )
)]
pub async fn get_dashboard(
    State(state): State<DashboardsApiState>,
    _caller: CurrentUser,
    Path(dashboard_id): Path<String>,
) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = load_dashboard(&state, &dashboard_id).await?;
    Ok(Json(dashboard))
}

/// Fetch the caller's saved filter inputs for a dashboard
#[utoipa::path(
    get,
    path = "/api/v1/dashboards/{dashboard_id}/filters",
    tag = "dashboards",
    params(
        ("dashboard_id" = String, Path, description = "Dashboard ID")
    ),
    responses(
        (status = 200, description = "Saved raw inputs", body = SavedFiltersResponse),
        (status = 404, description = "Unknown dashboard")
    )
)]
pub async fn get_saved_filters(
    State(state): State<DashboardsApiState>,
    caller: CurrentUser,
    Path(dashboard_id): Path<String>,
) -> Result<Json<SavedFiltersResponse>, ApiError> {
    load_dashboard(&state, &dashboard_id).await?;

    let filters = saved_filter::get_for_user(state.database.pool(), &caller.user_id, &dashboard_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(SavedFiltersResponse { filters }))
}

/// Save the caller's filter inputs for a dashboard.
///
/// Blank values delete the stored entry; ids that match no filter field of
/// the dashboard are ignored.
#[utoipa::path(
    put,
    path = "/api/v1/dashboards/{dashboard_id}/filters",
    tag = "dashboards",
    request_body = SaveFiltersRequest,
    params(
        ("dashboard_id" = String, Path, description = "Dashboard ID")
    ),
    responses(
        (status = 200, description = "Inputs saved", body = SaveFiltersResponse),
        (status = 404, description = "Unknown dashboard")
    )
)]
pub async fn save_filters(
    State(state): State<DashboardsApiState>,
    caller: CurrentUser,
    Path(dashboard_id): Path<String>,
    ValidatedJson(body): ValidatedJson<SaveFiltersRequest>,
) -> Result<Json<SaveFiltersResponse>, ApiError> {
    let dashboard = load_dashboard(&state, &dashboard_id).await?;

    // The saved_filters FK requires the user row to exist
    user::get_or_create(state.database.pool(), &caller.user_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    let entries: HashMap<String, String> = body
        .filters
        .into_iter()
        .filter(|(field_id, _)| dashboard.filter_fields.iter().any(|f| &f.id == field_id))
        .collect();

    saved_filter::save_for_user(state.database.pool(), &caller.user_id, &dashboard_id, &entries)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(SaveFiltersResponse { saved: entries.len() }))
}

/// Compute a line's widget payload under the given filters and overrides
#[utoipa::path(
    post,
    path = "/api/v1/dashboards/{dashboard_id}/lines/{line_id}/data",
    tag = "dashboards",
    request_body = LineDataRequest,
    params(
        ("dashboard_id" = String, Path, description = "Dashboard ID"),
        ("line_id" = String, Path, description = "Line ID")
    ),
    responses(
        (status = 200, description = "Widget payload", body = LineDataResponse),
        (status = 404, description = "Unknown dashboard or line")
    )
)]
pub async fn line_data(
    State(state): State<DashboardsApiState>,
    _caller: CurrentUser,
    Path((dashboard_id, line_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<LineDataRequest>,
) -> Result<Json<LineDataResponse>, ApiError> {
    let dashboard = load_dashboard(&state, &dashboard_id).await?;
    let line = dashboard
        .lines
        .iter()
        .find(|l| l.id == line_id)
        .ok_or_else(|| ApiError::not_found("LINE_NOT_FOUND", "Unknown dashboard line"))?;

    let mut settings = line.settings.clone();
    body.overrides.apply(&mut settings);

    let pool = state.database.pool();
    let fields = source::get_fields(pool, &line.source_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    let records = source::load_records(pool, &line.source_id, &fields)
        .await
        .map_err(ApiError::from_sqlite)?;

    let filter_set = FilterSet::compile(&dashboard.filter_fields, &body.filters);
    let filtered: Vec<Record> =
        records.into_iter().filter(|record| filter_set.matches(record)).collect();

    tracing::debug!(
        dashboard_id = %dashboard_id,
        line_id = %line_id,
        matched = filtered.len(),
        dropped_terms = filter_set.dropped_terms.len(),
        "Computed line data"
    );

    let payload = widgets::build_payload(&settings, &fields, &filtered);

    Ok(Json(LineDataResponse {
        payload,
        dropped_terms: filter_set.dropped_terms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_input_validation_limits() {
        let ok = HashMap::from([("abc".to_string(), "par*".to_string())]);
        assert!(validate_filter_inputs(&ok).is_ok());

        let bad_id = HashMap::from([("not an id!".to_string(), "x".to_string())]);
        assert!(validate_filter_inputs(&bad_id).is_err());

        let too_long =
            HashMap::from([("abc".to_string(), "x".repeat(MAX_FILTER_INPUT_LEN + 1))]);
        assert!(validate_filter_inputs(&too_long).is_err());
    }

    #[test]
    fn save_filters_request_validates() {
        let req = SaveFiltersRequest {
            filters: HashMap::from([("abc".to_string(), "ok".to_string())]),
        };
        assert!(req.validate().is_ok());

        let req = SaveFiltersRequest {
            filters: HashMap::from([("bad id".to_string(), "ok".to_string())]),
        };
        assert!(req.validate().is_err());
    }
}
