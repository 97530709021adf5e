//! Catalogue listing endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{CatalogueEntry, LoanFine, LoanReservation, OnLoan},
    AppState,
};

/// List every copy in the catalogue
#[utoipa::path(
    get,
    path = "/catalogue",
    tag = "catalogue",
    responses(
        (status = 200, description = "All copies with book and borrower", body = Vec<CatalogueEntry>)
    )
)]
pub async fn get_catalogue(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogueEntry>>> {
    let catalogue = state.services.catalogue.get_catalogue().await?;
    Ok(Json(catalogue))
}

/// List copies on loan, grouped by borrower
#[utoipa::path(
    get,
    path = "/catalogue/on-loan",
    tag = "catalogue",
    responses(
        (status = 200, description = "Borrowers with the books they hold", body = Vec<OnLoan>)
    )
)]
pub async fn get_on_loan(State(state): State<AppState>) -> AppResult<Json<Vec<OnLoan>>> {
    let on_loan = state.services.catalogue.get_on_loan().await?;
    Ok(Json(on_loan))
}

/// List all loan fines
#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    responses(
        (status = 200, description = "Loan fines", body = Vec<LoanFine>)
    )
)]
pub async fn get_loan_fines(State(state): State<AppState>) -> AppResult<Json<Vec<LoanFine>>> {
    let fines = state.services.catalogue.get_loan_fines().await?;
    Ok(Json(fines))
}

/// List all reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    responses(
        (status = 200, description = "Reservations ordered by copy and queue number", body = Vec<LoanReservation>)
    )
)]
pub async fn get_loan_reservations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LoanReservation>>> {
    let reservations = state.services.catalogue.get_loan_reservations().await?;
    Ok(Json(reservations))
}
