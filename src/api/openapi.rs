//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{catalogue, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstock API",
        version = "0.3.0",
        description = "Library loans, fines and reservations REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalogue
        catalogue::get_catalogue,
        catalogue::get_on_loan,
        catalogue::get_loan_fines,
        catalogue::get_loan_reservations,
        // Loans
        loans::update_loan,
        loans::return_loan,
        // Reservations
        loans::create_reservation,
        loans::get_reservation_status,
        // Fines
        loans::create_loan_fine,
    ),
    components(
        schemas(
            // Catalogue
            crate::models::book::Author,
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::borrower::Borrower,
            crate::models::book_stock::BookStock,
            crate::models::book_stock::CatalogueEntry,
            crate::models::book_stock::OnLoan,
            // Loans
            crate::models::loan::LoanUpdate,
            crate::models::loan::LoanUpdateResult,
            loans::ReturnLoanRequest,
            // Reservations
            crate::models::reservation::LoanReservation,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::ReservationStatus,
            // Fines
            crate::models::fine::LoanFine,
            crate::models::fine::CreateLoanFine,
            // Common
            crate::api::CreatedResponse,
            health::HealthResponse,
            health::ReadinessResponse,
            crate::config::StorageBackend,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalogue", description = "Catalogue listings"),
        (name = "loans", description = "Lending and returns"),
        (name = "reservations", description = "Reservation queues"),
        (name = "fines", description = "Loan fines")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
