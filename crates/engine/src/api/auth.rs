//! Caller identity extractors.
//!
//! Authentication happens upstream; the gateway forwards the user id in
//! `X-User-Id` and marks administrators with `X-User-Role: admin`.

use axum::{extract::FromRequestParts, http::request::Parts};
use waymark_domain::UserId;

use super::http::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const ADMIN_ROLE: &str = "admin";

/// Read the caller from the headers. A missing header is `None`; a header
/// that is present but unusable is rejected.
fn caller_from_parts(parts: &Parts) -> Result<Option<UserId>, ApiError> {
    let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let value = raw
        .to_str()
        .map_err(|_| ApiError::Unauthorized("X-User-Id is not valid text".into()))?;
    UserId::new(value)
        .map(Some)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))
}

/// Authenticated caller. Rejects with 401 when no identity was supplied.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts)?
            .map(AuthUser)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".into()))
    }
}

/// Optional caller for endpoints that also serve anonymous visitors.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<UserId>);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(caller_from_parts(parts)?))
    }
}

/// Authenticated administrator. 401 without identity, 403 without the role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserId);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE));

        if !is_admin {
            tracing::warn!(user_id = %user_id, "Non-admin attempted a catalog change");
            return Err(ApiError::Forbidden("Administrator role required".into()));
        }
        Ok(AdminUser(user_id))
    }
}
