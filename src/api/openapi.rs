//! OpenAPI documentation

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::api::{audit, borrows, fines, health, reservations, titles};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circula API",
        version = "1.0.0",
        description = "Library circulation lifecycle engine REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Titles
        titles::create_title,
        titles::list_titles,
        titles::get_title,
        titles::adjust_copies,
        titles::list_reservations,
        // Borrows
        borrows::submit_borrow,
        borrows::approve_borrow,
        borrows::reject_borrow,
        borrows::return_book,
        borrows::get_borrow,
        borrows::get_user_loans,
        // Reservations
        reservations::create_reservation,
        reservations::approve_reservation,
        reservations::reject_reservation,
        reservations::cancel_reservation,
        // Fines
        fines::get_fine,
        fines::pay_fine,
        fines::waive_fine,
        // Audit
        audit::list_audit,
    ),
    components(
        schemas(
            // Titles
            crate::models::title::Title,
            crate::models::title::CreateTitle,
            crate::models::copy::Copy,
            titles::AdjustCopiesRequest,
            // Borrows
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::BorrowDetails,
            borrows::SubmitBorrowRequest,
            borrows::ApproveBorrowRequest,
            borrows::RejectRequest,
            // Reservations
            crate::models::reservation::Reservation,
            reservations::CreateReservationRequest,
            reservations::ApproveReservationRequest,
            reservations::ReservationApprovalResponse,
            // Fines
            crate::models::fine::Fine,
            fines::SettleFineRequest,
            // Enums
            crate::models::enums::CopyStatus,
            crate::models::enums::BorrowStatus,
            crate::models::enums::ReservationStatus,
            crate::models::enums::FineStatus,
            // Notifications
            crate::engine::Notification,
            crate::engine::NotificationKind,
            // Audit
            crate::services::audit::AuditEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "titles", description = "Catalog titles and copy pools"),
        (name = "borrows", description = "Borrow request workflow"),
        (name = "reservations", description = "Reservation wait lists"),
        (name = "fines", description = "Overdue fines"),
        (name = "audit", description = "Gateway audit trail")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
