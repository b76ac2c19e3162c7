//! Loan ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{ExtendDueDate, Loan, LoanQuery},
};

use super::ApiJson;

/// List loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans, newest first", body = Vec<Loan>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list(&query).await?;
    Ok(Json(loans))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_by_id(id).await?;
    Ok(Json(loan))
}

/// Extend the due date of a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/extend_due_date",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = ExtendDueDate,
    responses(
        (status = 200, description = "Loan with its new due date", body = Loan),
        (status = 400, description = "Invalid additional_days or due date already passed"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn extend_due_date(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<ExtendDueDate>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.extend_due_date(id, &request).await?;
    Ok(Json(loan))
}
