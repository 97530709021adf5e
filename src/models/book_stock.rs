//! Book stock (lendable copy) model and catalogue views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{book::BookSummary, borrower::Borrower};

/// One lendable copy of a book.
///
/// `loan_end_date` and `on_loan_to` are either both set (on loan) or both
/// empty (available). Use [`BookStock::lend_to`] and [`BookStock::clear_loan`]
/// rather than touching the fields one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookStock {
    pub id: Uuid,
    pub book_id: Uuid,
    pub loan_end_date: Option<NaiveDate>,
    pub on_loan_to: Option<Uuid>,
}

impl BookStock {
    /// New copy, available for lending
    pub fn new(book_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            loan_end_date: None,
            on_loan_to: None,
        }
    }

    /// Borrower and due date of the current loan, if any
    pub fn current_loan(&self) -> Option<(Uuid, NaiveDate)> {
        match (self.on_loan_to, self.loan_end_date) {
            (Some(borrower_id), Some(end_date)) => Some((borrower_id, end_date)),
            _ => None,
        }
    }

    pub fn is_on_loan(&self) -> bool {
        self.current_loan().is_some()
    }

    pub fn lend_to(&mut self, borrower_id: Uuid, loan_end_date: NaiveDate) {
        self.on_loan_to = Some(borrower_id);
        self.loan_end_date = Some(loan_end_date);
    }

    pub fn clear_loan(&mut self) {
        self.on_loan_to = None;
        self.loan_end_date = None;
    }
}

/// Catalogue line: a copy with its book and current borrower
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogueEntry {
    pub id: Uuid,
    pub book: BookSummary,
    pub loan_end_date: Option<NaiveDate>,
    pub on_loan_to: Option<Borrower>,
}

/// Books currently held by one borrower
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OnLoan {
    pub borrower: Borrower,
    pub book_names: Vec<String>,
}
