//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        loan::Loan,
        member::{CreateMember, Member, TopActiveMember, UpdateMember},
    },
};

use super::ApiJson;

/// List all members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "Member list", body = Vec<Member>)
    )
)]
pub async fn list_members(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Member>>> {
    let members = state.services.members.list().await?;
    Ok(Json(members))
}

/// Get member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.get_by_id(id).await?;
    Ok(Json(member))
}

/// Create a member together with its user identity
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.services.members.create(&data).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Update a member
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(data): ApiJson<UpdateMember>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.update(id, &data).await?;
    Ok(Json(member))
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member has loan history")
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.members.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The five members with the most unreturned loans
#[utoipa::path(
    get,
    path = "/members/top-active",
    tag = "members",
    responses(
        (status = 200, description = "Most active members", body = Vec<TopActiveMember>)
    )
)]
pub async fn top_active_members(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<TopActiveMember>>> {
    let members = state.services.loans.top_active_members().await?;
    Ok(Json(members))
}

/// Get every loan of a member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member's loans", body = Vec<Loan>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.get_member_loans(id).await?;
    Ok(Json(loans))
}
