//! Book (catalog) endpoints, including the loan and return actions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        loan::{LoanConfirmation, MemberRef},
    },
};

use super::ApiJson;

/// One page of books
#[derive(Serialize, ToSchema)]
pub struct BookPage {
    pub items: Vec<Book>,
    /// Total number of matching books
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Books per page
    pub page_size: i64,
}

/// List books with filters and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = BookPage)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let (page_size, offset) = state.config.pagination.resolve(query.page, query.page_size);
    let (items, total) = state
        .services
        .catalog
        .search_books(&query, page_size, offset)
        .await?;
    Ok(Json(BookPage {
        items,
        total,
        page: offset / page_size + 1,
        page_size,
    }))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(data): ApiJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(id, &data).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has loan history")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Loan a copy of the book to a member
#[utoipa::path(
    post,
    path = "/books/{id}/loan",
    tag = "loans",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = MemberRef,
    responses(
        (status = 201, description = "Book loaned", body = LoanConfirmation),
        (status = 400, description = "No available copies or member does not exist"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn loan_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<MemberRef>,
) -> AppResult<(StatusCode, Json<LoanConfirmation>)> {
    let loan = state.services.loans.loan_book(id, request.member_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(LoanConfirmation {
            status: "Book loaned successfully".to_string(),
            loan,
        }),
    ))
}

/// Return a copy of the book loaned to a member
#[utoipa::path(
    post,
    path = "/books/{id}/return_book",
    tag = "loans",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = MemberRef,
    responses(
        (status = 200, description = "Book returned", body = LoanConfirmation),
        (status = 400, description = "Active loan does not exist"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<MemberRef>,
) -> AppResult<Json<LoanConfirmation>> {
    let loan = state.services.loans.return_book(id, request.member_id).await?;
    Ok(Json(LoanConfirmation {
        status: "Book returned successfully".to_string(),
        loan,
    }))
}
