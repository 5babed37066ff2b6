use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use models::haircut::HairCutFilter;
use serde::Deserialize;
use service::pagination::{Listed, Pagination};
use service::views::HairCutView;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use super::auth::ServerState;
use crate::errors::JsonApiError;
use crate::forms::{QueryParams, UpsertForm};

const IMAGES_FIELD: &str = "images";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HairCutQuery {
    /// Whitespace or comma separated terms matched against description,
    /// price and minutes.
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub minutes: Option<i32>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Any non-empty value returns a plain array.
    pub not_paginator: Option<String>,
}

#[utoipa::path(
    get, path = "/haircut", tag = "haircut",
    params(HairCutQuery),
    responses((status = 200, description = "Page of haircuts, or an array when not_paginator is set", body = crate::openapi::HairCutPageDoc))
)]
pub async fn list(
    State(state): State<ServerState>,
    QueryParams(q): QueryParams<HairCutQuery>,
) -> Result<Json<Listed<HairCutView>>, JsonApiError> {
    let filter = HairCutFilter { search: q.search, is_active: q.is_active, minutes: q.minutes };
    let paging = Pagination::from_query(q.page, q.per_page, q.not_paginator.as_deref());
    let listed = state.haircuts.list(&filter, paging).await?;
    info!(count = listed.len(), "list haircuts");
    Ok(Json(listed))
}

#[utoipa::path(
    post, path = "/haircut", tag = "haircut",
    request_body(content = crate::openapi::HairCutFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = crate::openapi::HairCutDoc),
        (status = 400, description = "Validation Error")
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    mut form: UpsertForm,
) -> Result<(StatusCode, Json<HairCutView>), JsonApiError> {
    let fields = form.haircut_fields()?;
    let uploads = form.take_files(IMAGES_FIELD);
    let created = state.haircuts.create(fields, uploads).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/haircut/{id}", tag = "haircut",
    params(("id" = Uuid, Path, description = "Haircut ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::HairCutDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<HairCutView>, JsonApiError> {
    Ok(Json(state.haircuts.get(id).await?))
}

/// PUT and PATCH share this handler: absent fields are left untouched and
/// the image set is replaced only when new images are sent.
#[utoipa::path(
    put, path = "/haircut/{id}", tag = "haircut",
    params(("id" = Uuid, Path, description = "Haircut ID")),
    request_body(content = crate::openapi::HairCutFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::HairCutDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    mut form: UpsertForm,
) -> Result<Json<HairCutView>, JsonApiError> {
    let fields = form.haircut_fields()?;
    let uploads = form.has_files(IMAGES_FIELD).then(|| form.take_files(IMAGES_FIELD));
    Ok(Json(state.haircuts.update(id, fields, uploads).await?))
}

#[utoipa::path(
    delete, path = "/haircut/{id}", tag = "haircut",
    params(("id" = Uuid, Path, description = "Haircut ID")),
    responses(
        (status = 204, description = "Deleted with its images"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    state.haircuts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
