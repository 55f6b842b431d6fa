//! Reservation queue endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{BorrowRequest, Reservation},
};

use super::borrows::RejectRequest;

/// Create reservation request
#[derive(Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub user_id: i64,
    pub title_id: i64,
}

/// Approve reservation request
#[derive(Deserialize, ToSchema)]
pub struct ApproveReservationRequest {
    pub approver_id: i64,
    pub loan_period_days: Option<i64>,
}

/// Approval outcome: the reservation and the loan it became
#[derive(Serialize, ToSchema)]
pub struct ReservationApprovalResponse {
    pub reservation: Reservation,
    pub borrow_request: BorrowRequest,
}

/// Join the wait list for a title
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Queued reservation", body = Reservation),
        (status = 404, description = "Title not found"),
        (status = 409, description = "User already queued or borrowing", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state
        .services
        .circulation
        .reserve(request.user_id, request.title_id)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Approve a fulfilled reservation, converting its hold into a loan
#[utoipa::path(
    post,
    path = "/reservations/{id}/approve",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    request_body = ApproveReservationRequest,
    responses(
        (status = 200, description = "Reservation approved", body = ReservationApprovalResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not awaiting approval", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_reservation(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i64>,
    Json(request): Json<ApproveReservationRequest>,
) -> AppResult<Json<ReservationApprovalResponse>> {
    let (reservation, borrow_request) = state
        .services
        .circulation
        .approve_reservation(reservation_id, request.approver_id, request.loan_period_days)
        .await?;
    Ok(Json(ReservationApprovalResponse {
        reservation,
        borrow_request,
    }))
}

/// Reject a fulfilled reservation; its copy cascades to the next waiter
#[utoipa::path(
    post,
    path = "/reservations/{id}/reject",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected reservation", body = Reservation),
        (status = 400, description = "Missing rejection reason"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not awaiting approval")
    )
)]
pub async fn reject_reservation(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> AppResult<Json<Reservation>> {
    let reservation = state
        .services
        .circulation
        .reject_reservation(reservation_id, request.approver_id, &request.reason)
        .await?;
    Ok(Json(reservation))
}

/// Cancel a queued or fulfilled reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Cancelled reservation", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation already settled")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    Path(reservation_id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let reservation = state
        .services
        .circulation
        .cancel_reservation(reservation_id)
        .await?;
    Ok(Json(reservation))
}
