//! `/api/users` endpoints.
//!
//! Path and body rejections are turned into a 400 envelope so clients always
//! get the same response shape.

use axum::{
    Json,
    extract::{
        Extension, Path,
        rejection::{JsonRejection, PathRejection},
    },
};

use super::{ApiError, ResponseEnvelope};
use crate::users::{CreatedUser, NewUser, UserService, UserSummary};

type ApiResult<T> = Result<Json<ResponseEnvelope<T>>, ApiError>;

fn path_value<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users ordered by id", body = ResponseEnvelope<Vec<UserSummary>>),
        (status = 500, description = "Storage failure", body = ResponseEnvelope<Vec<UserSummary>>)
    ),
    tag = "users"
)]
pub async fn list_users(service: Extension<UserService>) -> ApiResult<Vec<UserSummary>> {
    let users = service.list().await?;
    Ok(Json(ResponseEnvelope::success(users)))
}

#[utoipa::path(
    get,
    path = "/api/users/{limit}/{offset}",
    params(
        ("limit" = i64, Path, description = "Number of consecutive ids in the window, at least 1"),
        ("offset" = i64, Path, description = "Window starts at offset + 1, or at 0 when offset is 0")
    ),
    responses(
        (status = 200, description = "Users whose id falls in the window", body = ResponseEnvelope<Vec<UserSummary>>),
        (status = 400, description = "Invalid limit or offset", body = ResponseEnvelope<Vec<UserSummary>>)
    ),
    tag = "users"
)]
pub async fn page_users(
    service: Extension<UserService>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Vec<UserSummary>> {
    let (limit, offset) = path_value(path)?;
    let users = service.page(limit, offset).await?;
    Ok(Json(ResponseEnvelope::success(users)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = ResponseEnvelope<UserSummary>),
        (status = 404, description = "No user with this id", body = ResponseEnvelope<UserSummary>)
    ),
    tag = "users"
)]
pub async fn get_user(
    service: Extension<UserService>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<UserSummary> {
    let id = path_value(path)?;
    let user = service.get(id).await?;
    Ok(Json(ResponseEnvelope::success(user)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "User created in the Active state", body = ResponseEnvelope<CreatedUser>),
        (status = 400, description = "Invalid login, password or group code", body = ResponseEnvelope<CreatedUser>),
        (status = 409, description = "Login taken, admin already exists, or a concurrent signup for the same login", body = ResponseEnvelope<CreatedUser>)
    ),
    tag = "users"
)]
pub async fn create_user(
    service: Extension<UserService>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<CreatedUser> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let created = service.create(request).await?;
    Ok(Json(ResponseEnvelope::success(created)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User moved to Blocked", body = ResponseEnvelope<bool>),
        (status = 404, description = "No user with this id", body = ResponseEnvelope<bool>),
        (status = 409, description = "User is already blocked", body = ResponseEnvelope<bool>)
    ),
    tag = "users"
)]
pub async fn block_user(
    service: Extension<UserService>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<bool> {
    let id = path_value(path)?;
    let blocked = service.block(id).await?;
    Ok(Json(ResponseEnvelope::success(blocked)))
}
