//! Fine endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::Fine};

/// Settle fine request (pay or waive)
#[derive(Deserialize, ToSchema)]
pub struct SettleFineRequest {
    pub approver_id: i64,
}

/// Get the fine owed on a borrow request, computed as of now unless settled
#[utoipa::path(
    get,
    path = "/borrows/{id}/fine",
    tag = "fines",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    responses(
        (status = 200, description = "The fine", body = Fine),
        (status = 404, description = "Borrow request not found")
    )
)]
pub async fn get_fine(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
) -> AppResult<Json<Fine>> {
    Ok(Json(state.services.fines.get_fine(request_id).await?))
}

/// Record payment of an accrued fine, freezing its amount
#[utoipa::path(
    post,
    path = "/borrows/{id}/fine/pay",
    tag = "fines",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    request_body = SettleFineRequest,
    responses(
        (status = 200, description = "Paid fine", body = Fine),
        (status = 404, description = "Borrow request not found"),
        (status = 409, description = "Nothing owed or already settled", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay_fine(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
    Json(request): Json<SettleFineRequest>,
) -> AppResult<Json<Fine>> {
    Ok(Json(
        state
            .services
            .fines
            .record_payment(request_id, request.approver_id)
            .await?,
    ))
}

/// Waive an accrued fine, freezing its amount
#[utoipa::path(
    post,
    path = "/borrows/{id}/fine/waive",
    tag = "fines",
    params(
        ("id" = i64, Path, description = "Borrow request ID")
    ),
    request_body = SettleFineRequest,
    responses(
        (status = 200, description = "Waived fine", body = Fine),
        (status = 404, description = "Borrow request not found"),
        (status = 409, description = "Nothing owed or already settled")
    )
)]
pub async fn waive_fine(
    State(state): State<crate::AppState>,
    Path(request_id): Path<i64>,
    Json(request): Json<SettleFineRequest>,
) -> AppResult<Json<Fine>> {
    Ok(Json(
        state
            .services
            .fines
            .waive(request_id, request.approver_id)
            .await?,
    ))
}
