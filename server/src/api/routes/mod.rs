//! API route modules

pub mod dashboards;
pub mod health;
pub mod sources;
pub mod users;

use sqlx::SqlitePool;

use super::types::ApiError;
use crate::data::sqlite::repositories::user;

/// Reject callers without the manager role.
///
/// Creates the user row on first sight (the first user of a fresh database
/// bootstraps as manager).
pub(crate) async fn require_manager(pool: &SqlitePool, user_id: &str) -> Result<(), ApiError> {
    let user = user::get_or_create(pool, user_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !user.is_manager {
        return Err(ApiError::forbidden(
            "MANAGER_REQUIRED",
            "Only managers may modify dashboards and sources",
        ));
    }
    Ok(())
}
