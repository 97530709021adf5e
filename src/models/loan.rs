//! Loan update requests and results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::book_stock::BookStock;

/// Loan change for a copy.
///
/// A borrower with an end date lends the copy; an empty update returns it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoanUpdate {
    pub borrower_id: Option<Uuid>,
    pub loan_end_date: Option<NaiveDate>,
}

/// Loan state of a copy after a lend or return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanUpdateResult {
    pub book_stock_id: Uuid,
    pub loan_end_date: Option<NaiveDate>,
    pub borrower_id: Option<Uuid>,
}

impl From<&BookStock> for LoanUpdateResult {
    fn from(stock: &BookStock) -> Self {
        Self {
            book_stock_id: stock.id,
            loan_end_date: stock.loan_end_date,
            borrower_id: stock.on_loan_to,
        }
    }
}
