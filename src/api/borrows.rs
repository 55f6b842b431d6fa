//! Borrow workflow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{BorrowDetails, BorrowRequest},
};

/// Submit borrow request
#[derive(Deserialize, ToSchema)]
pub struct SubmitBorrowRequest {
    pub user_id: i64,
    pub title_id: i64,
}

/// Approve borrow request
#[derive(Deserialize, ToSchema)]
pub struct ApproveBorrowRequest {
    pub approver_id: i64,
    /// Loan duration override; the configured policy default applies when
    /// omitted
    pub loan_period_days: Option<i64>,
}

/// Reject borrow request
#[derive(Deserialize, ToSchema)]
pub struct RejectRequest {
    pub approver_id: i64,
    /// Mandatory; an empty reason is rejected
    pub reason: String,
}

/// Submit a borrow request; the copy is held from submission
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = SubmitBorrowRequest,
    responses(
        (status = 201, description = "Pending borrow request", body = BorrowRequest),
        (status = 404, description = "Title not found"),
        (status = 409, description = "No copy available; offer a reservation", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<SubmitBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let borrow = state
        .services
        .circulation
        .submit_borrow(request.user_id, request.title_id)
        .await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Approve a pending borrow request, starting the loan
#[utoipa::path(
    post,
    path = "/borrows/{id}/approve",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    request_body = ApproveBorrowRequest,
    responses(
        (status = 200, description = "Active loan", body = BorrowRequest),
        (status = 404, description = "Borrow request not found"),
        (status = 409, description = "Request is not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_borrow(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
    Json(request): Json<ApproveBorrowRequest>,
) -> AppResult<Json<BorrowRequest>> {
    let borrow = state
        .services
        .circulation
        .approve_borrow(request_id, request.approver_id, request.loan_period_days)
        .await?;
    Ok(Json(borrow))
}

/// Reject a pending borrow request, releasing its held copy
#[utoipa::path(
    post,
    path = "/borrows/{id}/reject",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected request", body = BorrowRequest),
        (status = 400, description = "Missing rejection reason", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrow request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_borrow(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> AppResult<Json<BorrowRequest>> {
    let borrow = state
        .services
        .circulation
        .reject_borrow(request_id, request.approver_id, &request.reason)
        .await?;
    Ok(Json(borrow))
}

/// Return an active loan; the freed copy is offered to waiting reservations
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    responses(
        (status = 200, description = "Returned loan", body = BorrowDetails),
        (status = 404, description = "Borrow request not found"),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
) -> AppResult<Json<BorrowDetails>> {
    Ok(Json(
        state.services.circulation.return_book(request_id).await?,
    ))
}

/// Get a borrow request with its derived overdue flag
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    responses(
        (status = 200, description = "The borrow request", body = BorrowDetails),
        (status = 404, description = "Borrow request not found")
    )
)]
pub async fn get_borrow(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
) -> AppResult<Json<BorrowDetails>> {
    Ok(Json(
        state.services.circulation.get_request(request_id).await?,
    ))
}

/// Get a user's open loans and pending requests across titles
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user's open loans", body = Vec<BorrowDetails>)
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> Json<Vec<BorrowDetails>> {
    Json(state.services.circulation.user_loans(user_id).await)
}
