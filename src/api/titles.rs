//! Title (catalog) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{title::CreateTitle, Reservation, Title},
};

/// Adjust copy count request
#[derive(Deserialize, ToSchema)]
pub struct AdjustCopiesRequest {
    /// New total number of physical copies
    pub new_total: u32,
    /// Acting librarian, recorded in the audit trail
    pub actor_id: Option<i64>,
}

/// Create a catalog title with an initial copy pool
#[utoipa::path(
    post,
    path = "/titles",
    tag = "titles",
    request_body = CreateTitle,
    responses(
        (status = 201, description = "Title created", body = Title)
    )
)]
pub async fn create_title(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateTitle>,
) -> AppResult<(StatusCode, Json<Title>)> {
    let title = state
        .services
        .catalog
        .create_title(request.name, request.total_copies)
        .await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// List all titles with availability counts
#[utoipa::path(
    get,
    path = "/titles",
    tag = "titles",
    responses(
        (status = 200, description = "All titles", body = Vec<Title>)
    )
)]
pub async fn list_titles(State(state): State<crate::AppState>) -> Json<Vec<Title>> {
    Json(state.services.catalog.list_titles().await)
}

/// Get a title with its availability counts
#[utoipa::path(
    get,
    path = "/titles/{id}",
    tag = "titles",
    params(
        ("id" = i64, Path, description = "Title ID")
    ),
    responses(
        (status = 200, description = "The title", body = Title),
        (status = 404, description = "Title not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_title(
    State(state): State<crate::AppState>,
    Path(title_id): Path<i64>,
) -> AppResult<Json<Title>> {
    Ok(Json(state.services.catalog.get_title(title_id).await?))
}

/// Change a title's total copy count
#[utoipa::path(
    put,
    path = "/titles/{id}/copies",
    tag = "titles",
    params(
        ("id" = i64, Path, description = "Title ID")
    ),
    request_body = AdjustCopiesRequest,
    responses(
        (status = 200, description = "Adjusted title", body = Title),
        (status = 404, description = "Title not found"),
        (status = 422, description = "Reduction below loaned copies", body = crate::error::ErrorResponse)
    )
)]
pub async fn adjust_copies(
    State(state): State<crate::AppState>,
    Path(title_id): Path<i64>,
    Json(request): Json<AdjustCopiesRequest>,
) -> AppResult<Json<Title>> {
    let title = state
        .services
        .catalog
        .adjust_total_copies(title_id, request.new_total, request.actor_id)
        .await?;
    Ok(Json(title))
}

/// Get a title's reservation queue in arrival order
#[utoipa::path(
    get,
    path = "/titles/{id}/reservations",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Title ID")
    ),
    responses(
        (status = 200, description = "Reservations in queue order", body = Vec<Reservation>),
        (status = 404, description = "Title not found")
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Path(title_id): Path<i64>,
) -> AppResult<Json<Vec<Reservation>>> {
    Ok(Json(
        state.services.catalog.title_reservations(title_id).await?,
    ))
}
