//! Loan, reservation and fine endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CreateLoanFine, CreateReservation, LoanUpdate, LoanUpdateResult, ReservationStatus},
    AppState,
};

use super::CreatedResponse;

/// Return request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Borrower whose reservation on this copy is fulfilled by the return
    pub borrower_id: Option<Uuid>,
}

/// Decode an optional JSON body; an empty body decodes to `None`
fn optional_json<T: DeserializeOwned>(body: &[u8]) -> AppResult<Option<T>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Lend or return a copy
#[utoipa::path(
    patch,
    path = "/catalogue/{book_stock_id}/loan",
    tag = "loans",
    params(
        ("book_stock_id" = Uuid, Path, description = "Book stock ID")
    ),
    request_body = LoanUpdate,
    responses(
        (status = 200, description = "Loan updated", body = LoanUpdateResult),
        (status = 400, description = "Missing or past end date, unknown copy or borrower"),
        (status = 409, description = "End date without borrower, or copy already returned")
    )
)]
pub async fn update_loan(
    State(state): State<AppState>,
    Path(book_stock_id): Path<Uuid>,
    Json(update): Json<LoanUpdate>,
) -> AppResult<Json<LoanUpdateResult>> {
    let result = state.services.loans.update_loan(book_stock_id, update).await?;
    Ok(Json(result))
}

/// Return a copy
#[utoipa::path(
    post,
    path = "/catalogue/{book_stock_id}/loan/return",
    tag = "loans",
    params(
        ("book_stock_id" = Uuid, Path, description = "Book stock ID")
    ),
    request_body(content = ReturnLoanRequest, description = "Optional; names the reserving borrower"),
    responses(
        (status = 200, description = "Copy returned", body = LoanUpdateResult),
        (status = 400, description = "Unknown copy or undecodable body"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    Path(book_stock_id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Json<LoanUpdateResult>> {
    let request: Option<ReturnLoanRequest> = optional_json(&body)?;
    let borrower_id = request.and_then(|request| request.borrower_id);
    let result = state
        .services
        .loans
        .return_loan(book_stock_id, borrower_id)
        .await?;
    Ok(Json(result))
}

/// Reserve a copy
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = CreatedResponse),
        (status = 404, description = "Copy or borrower not found"),
        (status = 409, description = "Borrower already in the queue")
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = state.services.loans.reserve(request).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Queue position of a borrower for a copy
#[utoipa::path(
    get,
    path = "/catalogue/{book_stock_id}/reservations/{borrower_id}",
    tag = "reservations",
    params(
        ("book_stock_id" = Uuid, Path, description = "Book stock ID"),
        ("borrower_id" = Uuid, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Reservation status", body = ReservationStatus),
        (status = 404, description = "No such reservation")
    )
)]
pub async fn get_reservation_status(
    State(state): State<AppState>,
    Path((book_stock_id, borrower_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ReservationStatus>> {
    let status = state
        .services
        .loans
        .reservation_status(borrower_id, book_stock_id)
        .await?;
    Ok(Json(status))
}

/// Add a fine by hand
#[utoipa::path(
    post,
    path = "/fines",
    tag = "fines",
    request_body = CreateLoanFine,
    responses(
        (status = 201, description = "Fine created", body = CreatedResponse),
        (status = 404, description = "Copy or borrower not found")
    )
)]
pub async fn create_loan_fine(
    State(state): State<AppState>,
    Json(request): Json<CreateLoanFine>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = state.services.loans.add_fine(request).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_json() {
        let empty: Option<ReturnLoanRequest> = optional_json(b"").unwrap();
        assert!(empty.is_none());

        let blank: Option<ReturnLoanRequest> = optional_json(b" \n").unwrap();
        assert!(blank.is_none());

        let borrower_id = Uuid::new_v4();
        let body = format!(r#"{{"borrower_id":"{}"}}"#, borrower_id);
        let request: Option<ReturnLoanRequest> = optional_json(body.as_bytes()).unwrap();
        assert_eq!(request.and_then(|r| r.borrower_id), Some(borrower_id));

        let bad = optional_json::<ReturnLoanRequest>(br#"{"borrower_id":"not-a-uuid"}"#);
        assert!(matches!(bad, Err(AppError::BadRequest(_))));

        let truncated = optional_json::<ReturnLoanRequest>(b"{");
        assert!(matches!(truncated, Err(AppError::BadRequest(_))));
    }
}
