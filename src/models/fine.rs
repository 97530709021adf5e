//! Loan fine model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Penalty raised against a borrower for a copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanFine {
    pub id: Uuid,
    pub borrower_id: Uuid,
    pub book_stock_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl LoanFine {
    /// Active fine for an overdue return
    pub fn issue(borrower_id: Uuid, book_stock_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            borrower_id,
            book_stock_id,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Create fine request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLoanFine {
    pub borrower_id: Uuid,
    pub book_stock_id: Uuid,
    /// Defaults to true
    pub active: Option<bool>,
}
