//! API handlers for the bookstock REST endpoints

pub mod catalogue;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;

/// Identifier of a newly created record
#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalogue
        .route("/catalogue", get(catalogue::get_catalogue))
        .route("/catalogue/on-loan", get(catalogue::get_on_loan))
        // Loans
        .route("/catalogue/:book_stock_id/loan", patch(loans::update_loan))
        .route("/catalogue/:book_stock_id/loan/return", post(loans::return_loan))
        // Reservations
        .route(
            "/catalogue/:book_stock_id/reservations/:borrower_id",
            get(loans::get_reservation_status),
        )
        .route(
            "/reservations",
            get(catalogue::get_loan_reservations).post(loans::create_reservation),
        )
        // Fines
        .route(
            "/fines",
            get(catalogue::get_loan_fines).post(loans::create_loan_fine),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
