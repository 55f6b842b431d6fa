//! API handlers for Circula REST endpoints

pub mod audit;
pub mod borrows;
pub mod fines;
pub mod health;
pub mod openapi;
pub mod reservations;
pub mod titles;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Titles (catalog)
        .route("/titles", get(titles::list_titles))
        .route("/titles", post(titles::create_title))
        .route("/titles/:id", get(titles::get_title))
        .route("/titles/:id/copies", put(titles::adjust_copies))
        .route("/titles/:id/reservations", get(titles::list_reservations))
        // Borrow workflow
        .route("/borrows", post(borrows::submit_borrow))
        .route("/borrows/:id", get(borrows::get_borrow))
        .route("/borrows/:id/approve", post(borrows::approve_borrow))
        .route("/borrows/:id/reject", post(borrows::reject_borrow))
        .route("/borrows/:id/return", post(borrows::return_book))
        .route("/users/:id/loans", get(borrows::get_user_loans))
        // Reservations
        .route("/reservations", post(reservations::create_reservation))
        .route(
            "/reservations/:id/approve",
            post(reservations::approve_reservation),
        )
        .route(
            "/reservations/:id/reject",
            post(reservations::reject_reservation),
        )
        .route(
            "/reservations/:id/cancel",
            post(reservations::cancel_reservation),
        )
        // Fines
        .route("/borrows/:id/fine", get(fines::get_fine))
        .route("/borrows/:id/fine/pay", post(fines::pay_fine))
        .route("/borrows/:id/fine/waive", post(fines::waive_fine))
        // Audit
        .route("/audit", get(audit::list_audit))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
