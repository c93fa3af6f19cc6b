//! User API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::CurrentUser;
use crate::api::types::ApiError;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::user;

/// Shared state for User API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub database: Arc<SqliteService>,
}

/// Build User API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = UsersApiState { database };

    Router::new().route("/me", get(me)).with_state(state)
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: String,
    pub display_name: Option<String>,
    /// Managers may create dashboards and sources
    pub is_manager: bool,
}

/// Identify the caller and report their role
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing user header")
    )
)]
pub async fn me(
    State(state): State<UsersApiState>,
    caller: CurrentUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = user::get_or_create(state.database.pool(), &caller.user_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(MeResponse {
        user_id: user.id,
        display_name: user.display_name,
        is_manager: user.is_manager,
    }))
}
