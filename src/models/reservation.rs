//! Loan reservation (waiting list) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A place in the waiting list of one copy.
///
/// Queue numbers of a copy start at 0 and have no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanReservation {
    pub id: Uuid,
    pub borrower_id: Option<Uuid>,
    pub book_stock_id: Uuid,
    pub queue_number: i32,
}

/// Create reservation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub book_stock_id: Uuid,
    pub borrower_id: Uuid,
}

/// Where a borrower stands in the waiting list of a copy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationStatus {
    pub book_stock_id: Uuid,
    pub borrower_id: Uuid,
    pub queue_number: i32,
    /// Only known for the head of the queue
    pub expected_available_on: Option<NaiveDate>,
    pub message: String,
}

impl ReservationStatus {
    /// Build the status of `reservation`; `loan_end_date` is the copy's current due date.
    pub fn new(reservation: &LoanReservation, borrower_id: Uuid, loan_end_date: Option<NaiveDate>) -> Self {
        let queue_number = reservation.queue_number;
        let (expected_available_on, message) = if queue_number > 0 {
            (
                None,
                format!(
                    "You are number {} in the reservation queue. \
                     The date this item becomes available to you cannot be determined yet.",
                    queue_number
                ),
            )
        } else {
            match loan_end_date {
                Some(date) => (
                    Some(date),
                    format!(
                        "You are number 0 in the reservation queue. \
                         This item is expected to be available on {}.",
                        date.format("%Y-%m-%d")
                    ),
                ),
                None => (
                    None,
                    "You are number 0 in the reservation queue. This item is available now."
                        .to_string(),
                ),
            }
        };

        Self {
            book_stock_id: reservation.book_stock_id,
            borrower_id,
            queue_number,
            expected_available_on,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(queue_number: i32) -> LoanReservation {
        LoanReservation {
            id: Uuid::new_v4(),
            borrower_id: Some(Uuid::new_v4()),
            book_stock_id: Uuid::new_v4(),
            queue_number,
        }
    }

    #[test]
    fn test_head_of_queue_reports_due_date() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let r = reservation(0);
        let status = ReservationStatus::new(&r, r.borrower_id.unwrap(), Some(due));
        assert_eq!(status.expected_available_on, Some(due));
        assert!(status.message.contains("2024-06-30"));
        assert!(status.message.contains("number 0"));
    }

    #[test]
    fn test_later_position_has_no_date() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let r = reservation(2);
        let status = ReservationStatus::new(&r, r.borrower_id.unwrap(), Some(due));
        assert_eq!(status.expected_available_on, None);
        assert!(status.message.contains("number 2"));
        assert!(!status.message.contains("2024-06-30"));
    }

    #[test]
    fn test_head_of_queue_on_available_copy() {
        let r = reservation(0);
        let status = ReservationStatus::new(&r, r.borrower_id.unwrap(), None);
        assert_eq!(status.expected_available_on, None);
        assert!(status.message.contains("available now"));
    }
}
