//! OpenAPI document generation

use axum::Json;
use utoipa::OpenApi;

use super::routes::{dashboards, health, sources, users};
use crate::data::sqlite::repositories::dashboard::{NewDashboard, NewFilterField, NewLine};
use crate::data::sqlite::repositories::source::{NewField, NewSource};
use crate::domain::model::{
    Aggregator, ChartType, Dashboard, DashboardLine, DisplayMode, FieldDef, FieldType,
    FilterField, LineOverrides, LineSettings, PivotSortBy, SortOrder, Source,
};
use crate::domain::widgets::graph::{GraphData, GraphDataset, GraphPayload};
use crate::domain::widgets::list::{ListColumn, ListPayload, ListRow};
use crate::domain::widgets::pivot::{PivotPayload, PivotRow};
use crate::domain::widgets::WidgetPayload;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tabord API",
        description = "Filterable dashboards over typed record sources"
    ),
    paths(
        health::health,
        users::me,
        dashboards::list_dashboards,
        dashboards::create_dashboard,
        dashboards::get_dashboard,
        dashboards::get_saved_filters,
        dashboards::save_filters,
        dashboards::line_data,
        sources::list_sources,
        sources::get_source,
        sources::create_source,
        sources::append_records,
    ),
    components(schemas(
        health::HealthResponse,
        users::MeResponse,
        dashboards::DashboardSummary,
        dashboards::ListDashboardsResponse,
        dashboards::CreateDashboardResponse,
        dashboards::SavedFiltersResponse,
        dashboards::SaveFiltersRequest,
        dashboards::SaveFiltersResponse,
        dashboards::LineDataRequest,
        dashboards::LineDataResponse,
        sources::SourceSummary,
        sources::ListSourcesResponse,
        sources::CreateSourceResponse,
        sources::AppendRecordsRequest,
        sources::AppendRecordsResponse,
        NewDashboard,
        NewLine,
        NewFilterField,
        NewSource,
        NewField,
        Dashboard,
        DashboardLine,
        Source,
        FilterField,
        FieldDef,
        FieldType,
        DisplayMode,
        ChartType,
        Aggregator,
        PivotSortBy,
        SortOrder,
        LineSettings,
        LineOverrides,
        WidgetPayload,
        ListPayload,
        ListColumn,
        ListRow,
        GraphPayload,
        GraphData,
        GraphDataset,
        PivotPayload,
        PivotRow,
    ))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_lists_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/health"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/dashboards/{dashboard_id}/lines/{line_id}/data"));
        assert_eq!(paths.len(), 9);
    }
}
