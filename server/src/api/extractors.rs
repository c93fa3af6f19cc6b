//! Request extractors for API routes

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::types::ApiError;

/// Header carrying the caller's identity. Authentication proper is delegated
/// to the reverse proxy in front of the server; the API only needs a stable
/// user id for saved filters and role checks.
pub const USER_HEADER: &str = "x-tabord-user";

/// Validate a caller-supplied id: 1-64 chars, alphanumeric + dash/underscore
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Caller identity extracted from the user header
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::unauthorized("MISSING_USER", format!("Missing {} header", USER_HEADER))
            })?;

        if !is_valid_id(value) {
            return Err(ApiError::bad_request(
                "INVALID_USER_ID",
                "User id must be 1-64 alphanumeric characters",
            ));
        }

        Ok(Self { user_id: value.to_string() })
    }
}

/// JSON body extractor that runs `validator` rules after deserialization
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request("INVALID_JSON", e.to_string()))?;

        value
            .validate()
            .map_err(|e| ApiError::bad_request("VALIDATION_ERROR", e.to_string()))?;

        Ok(Self(value))
    }
}
