//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use waymark_domain::{Badge, BadgeId, BadgeStats, BadgeWithProgress, TriggerEvent};
use waymark_shared::{
    CreateBadgeRequest, ErrorCode, ErrorResponse, EvaluateResponse, HealthResponse,
    ProcessEventResponse, UpdateBadgeRequest,
};

use super::auth::{AdminUser, AuthUser, Viewer};
use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::badges::{BadgeDetail, BadgeError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/badges", get(list_badges).post(create_badge))
        .route("/api/badges/evaluate", post(evaluate_badges))
        .route("/api/badges/events", post(process_event))
        .route(
            "/api/badges/{id}",
            get(get_badge).put(update_badge).delete(delete_badge),
        )
        .route("/api/users/me/badges", get(list_my_badges))
        .route("/api/users/me/badges/stats", get(get_my_stats))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn list_badges(
    State(app): State<Arc<App>>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<Badge>>, ApiError> {
    let badges = app
        .use_cases
        .badges
        .list
        .execute(viewer.as_ref())
        .await?;
    Ok(Json(badges))
}

async fn get_badge(
    State(app): State<Arc<App>>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_badge_id(id)?;
    let detail = app
        .use_cases
        .badges
        .get
        .execute(&id, viewer.as_ref())
        .await?;
    Ok(match detail {
        BadgeDetail::Anonymous(badge) => Json(badge).into_response(),
        BadgeDetail::WithProgress(entry) => Json(entry).into_response(),
    })
}

async fn create_badge(
    State(app): State<Arc<App>>,
    AdminUser(_admin): AdminUser,
    body: Result<Json<CreateBadgeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Badge>), ApiError> {
    let Json(request) = body?;
    let badge = app.use_cases.badges.manage.create(request).await?;
    Ok((StatusCode::CREATED, Json(badge)))
}

async fn update_badge(
    State(app): State<Arc<App>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateBadgeRequest>, JsonRejection>,
) -> Result<Json<Badge>, ApiError> {
    let id = parse_badge_id(id)?;
    let Json(request) = body?;
    let badge = app.use_cases.badges.manage.update(&id, request).await?;
    Ok(Json(badge))
}

async fn delete_badge(
    State(app): State<Arc<App>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_badge_id(id)?;
    app.use_cases.badges.manage.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn evaluate_badges(
    State(app): State<Arc<App>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let result = app.use_cases.badges.evaluate.execute(&user_id).await?;
    Ok(Json(result))
}

async fn process_event(
    State(app): State<Arc<App>>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<TriggerEvent>, JsonRejection>,
) -> Result<Json<ProcessEventResponse>, ApiError> {
    let Json(event) = body?;
    if event.user_id() != &user_id {
        tracing::warn!(
            user_id = %user_id,
            event_user_id = %event.user_id(),
            "Rejected event submitted for another user"
        );
        return Err(ApiError::Forbidden(
            "Events can only be submitted for the calling user".into(),
        ));
    }

    let unlocks = app
        .use_cases
        .badges
        .process_event
        .execute(&event)
        .await?;
    Ok(Json(ProcessEventResponse { unlocks }))
}

async fn list_my_badges(
    State(app): State<Arc<App>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<BadgeWithProgress>>, ApiError> {
    let badges = app
        .use_cases
        .badges
        .list_for_user
        .execute(&user_id)
        .await?;
    Ok(Json(badges))
}

async fn get_my_stats(
    State(app): State<Arc<App>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BadgeStats>, ApiError> {
    let stats = app.use_cases.badges.stats.execute(&user_id).await?;
    Ok(Json(stats))
}

fn parse_badge_id(raw: String) -> Result<BadgeId, ApiError> {
    BadgeId::try_from(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Conflict, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "Internal error".to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

impl From<BadgeError> for ApiError {
    fn from(e: BadgeError) -> Self {
        match e {
            BadgeError::NotFound(id) => ApiError::NotFound(format!("Badge not found: {id}")),
            BadgeError::Validation(msg) => ApiError::BadRequest(msg),
            BadgeError::AlreadyExists(msg) => ApiError::Conflict(msg),
            BadgeError::StorageUnavailable(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        BadgeError::from(e).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
