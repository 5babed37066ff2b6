use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::user::{UserFilter, UserStatus};
use serde::Deserialize;
use service::auth::domain::AuthUser;
use service::pagination::{Listed, Pagination};
use service::views::UserView;
use tracing::{info, warn};
use utoipa::IntoParams;
use uuid::Uuid;

use super::auth::ServerState;
use crate::errors::JsonApiError;
use crate::forms::{QueryParams, UpsertForm};

const PHOTO_FIELD: &str = "photo";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Terms matched against username, email and names.
    pub search: Option<String>,
    /// 0 inactive, 1 active, 2 suspended.
    pub status: Option<i16>,
    pub is_barber: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub not_paginator: Option<String>,
}

#[utoipa::path(
    get, path = "/user", tag = "user",
    params(UserQuery),
    responses((status = 200, description = "Page of users, or an array when not_paginator is set", body = crate::openapi::UserPageDoc)),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    QueryParams(q): QueryParams<UserQuery>,
) -> Result<Json<Listed<UserView>>, JsonApiError> {
    let status = match q.status {
        None => None,
        Some(code) => Some(
            UserStatus::from_code(code)
                .ok_or_else(|| JsonApiError::bad_request(format!("status: \"{code}\" is not a valid choice.")))?,
        ),
    };
    let filter = UserFilter { search: q.search, status, is_barber: q.is_barber };
    let paging = Pagination::from_query(q.page, q.per_page, q.not_paginator.as_deref());
    let listed = state.users.list(&filter, paging).await?;
    info!(count = listed.len(), "list users");
    Ok(Json(listed))
}

/// Public sign-up. The superuser flag cannot be set from here.
#[utoipa::path(
    post, path = "/user", tag = "user",
    request_body(content = crate::openapi::UserFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    mut form: UpsertForm,
) -> Result<(StatusCode, Json<UserView>), JsonApiError> {
    let mut input = form.user_input()?;
    if input.is_superuser.take().is_some() {
        warn!("is_superuser ignored on sign-up");
    }
    let photo = form.take_file(PHOTO_FIELD);
    let created = state.users.create(input, photo).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/user/{id}", tag = "user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::UserDoc),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(state.users.get(id).await?))
}

/// PUT and PATCH share this handler. A new `photo` replaces the previous
/// ones; only a superuser may change `is_superuser`.
#[utoipa::path(
    put, path = "/user/{id}", tag = "user",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body(content = crate::openapi::UserFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    mut form: UpsertForm,
) -> Result<Json<UserView>, JsonApiError> {
    let mut input = form.user_input()?;
    if !caller.is_superuser && input.is_superuser.take().is_some() {
        warn!(caller = %caller.id, user_id = %id, "is_superuser ignored for non-superuser caller");
    }
    let photo = form.take_file(PHOTO_FIELD);
    Ok(Json(state.users.update(id, input, photo).await?))
}

#[utoipa::path(
    delete, path = "/user/{id}", tag = "user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deactivated"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
