//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

use super::ApiJson;

/// List all authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Author list", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.catalog.create_author(&data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(data): ApiJson<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.update_author(id, &data).await?;
    Ok(Json(author))
}

/// Delete author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
