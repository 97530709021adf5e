//! Loan lifecycle: lending, returns, overdue fines and the reservation queue.
//!
//! Every operation runs in a single store transaction. Any error drops the
//! transaction before commit, so a failed call persists nothing.

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        CreateLoanFine, CreateReservation, LoanFine, LoanReservation, LoanUpdate,
        LoanUpdateResult, ReservationStatus,
    },
    repository::{Repository, StoreTransaction},
};

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Queue number changes that close the gap left by removing `removed`.
///
/// `queue` must be ordered by queue number. Every reservation strictly behind
/// the removed slot moves up by one, in ascending order.
pub fn close_queue_gap(queue: &[LoanReservation], removed: i32) -> Vec<(Uuid, i32)> {
    queue
        .iter()
        .filter(|r| r.queue_number > removed)
        .map(|r| (r.id, r.queue_number - 1))
        .collect()
}

#[derive(Clone)]
pub struct LoanLifecycleManager {
    repository: Repository,
    today: fn() -> NaiveDate,
}

impl LoanLifecycleManager {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            today: local_today,
        }
    }

    /// Replace the calendar used for due-date checks
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Lend a copy to a borrower until `loan_end_date`
    pub async fn lend(
        &self,
        book_stock_id: Uuid,
        borrower_id: Uuid,
        loan_end_date: Option<NaiveDate>,
    ) -> AppResult<LoanUpdateResult> {
        let loan_end_date = loan_end_date.ok_or_else(|| {
            AppError::Validation("Cannot set a borrower without a loan end date".to_string())
        })?;

        if loan_end_date < (self.today)() {
            return Err(AppError::Validation(
                "Loan end date cannot be in the past".to_string(),
            ));
        }

        let mut tx = self.repository.store().begin().await?;

        let mut stock = tx.book_stock(book_stock_id).await?.ok_or_else(|| {
            AppError::Validation(format!("Book stock {} does not exist", book_stock_id))
        })?;
        let borrower = tx.borrower(borrower_id).await?.ok_or_else(|| {
            AppError::Validation(format!("Borrower {} does not exist", borrower_id))
        })?;

        stock.lend_to(borrower.id, loan_end_date);
        tx.save_loan(&stock).await?;
        tx.commit().await?;

        tracing::info!(
            "Book stock {} lent to borrower {} until {}",
            stock.id,
            borrower.id,
            loan_end_date
        );

        Ok(LoanUpdateResult::from(&stock))
    }

    /// Return a copy.
    ///
    /// An overdue return fines the previous borrower. When `borrower_id` holds
    /// a reservation on the copy, that reservation is fulfilled and removed.
    pub async fn return_loan(
        &self,
        book_stock_id: Uuid,
        borrower_id: Option<Uuid>,
    ) -> AppResult<LoanUpdateResult> {
        let today = (self.today)();
        let mut tx = self.repository.store().begin().await?;

        let mut stock = tx.book_stock(book_stock_id).await?.ok_or_else(|| {
            AppError::Validation(format!("Book stock {} does not exist", book_stock_id))
        })?;

        let (previous_borrower, loan_end_date) = stock.current_loan().ok_or_else(|| {
            AppError::InvalidState(format!(
                "Book stock {} is already returned",
                book_stock_id
            ))
        })?;

        if loan_end_date < today {
            let fine = LoanFine::issue(previous_borrower, stock.id);
            tx.insert_fine(&fine).await?;
            tracing::warn!(
                "Overdue return of book stock {} (due {}), fine {} issued to borrower {}",
                stock.id,
                loan_end_date,
                fine.id,
                previous_borrower
            );
        }

        if let Some(borrower_id) = borrower_id {
            fulfil_reservation(&mut tx, stock.id, borrower_id).await?;
        }

        stock.clear_loan();
        tx.save_loan(&stock).await?;
        tx.commit().await?;

        tracing::info!("Book stock {} returned", stock.id);

        Ok(LoanUpdateResult::from(&stock))
    }

    /// Apply a loan update: a borrower lends the copy, an empty update returns it
    pub async fn update_loan(
        &self,
        book_stock_id: Uuid,
        update: LoanUpdate,
    ) -> AppResult<LoanUpdateResult> {
        match (update.borrower_id, update.loan_end_date) {
            (Some(borrower_id), loan_end_date) => {
                self.lend(book_stock_id, borrower_id, loan_end_date).await
            }
            (None, Some(_)) => Err(AppError::InvalidState(
                "Cannot set a loan end date without a borrower".to_string(),
            )),
            (None, None) => self.return_loan(book_stock_id, None).await,
        }
    }

    /// Put a borrower at the tail of a copy's reservation queue
    pub async fn reserve(&self, request: CreateReservation) -> AppResult<Uuid> {
        let mut tx = self.repository.store().begin().await?;

        tx.book_stock(request.book_stock_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Book stock {} not found", request.book_stock_id))
        })?;
        tx.borrower(request.borrower_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Borrower {} not found", request.borrower_id))
        })?;

        let queue = tx.reservations_for(request.book_stock_id).await?;
        if queue
            .iter()
            .any(|r| r.borrower_id == Some(request.borrower_id))
        {
            return Err(AppError::InvalidState(format!(
                "Borrower {} already has a reservation for book stock {}",
                request.borrower_id, request.book_stock_id
            )));
        }

        let reservation = LoanReservation {
            id: Uuid::new_v4(),
            borrower_id: Some(request.borrower_id),
            book_stock_id: request.book_stock_id,
            queue_number: queue.len() as i32,
        };
        tx.insert_reservation(&reservation).await?;
        tx.commit().await?;

        tracing::info!(
            "Reservation {} created for book stock {} at position {}",
            reservation.id,
            reservation.book_stock_id,
            reservation.queue_number
        );

        Ok(reservation.id)
    }

    /// Queue position of a borrower for a copy
    pub async fn reservation_status(
        &self,
        borrower_id: Uuid,
        book_stock_id: Uuid,
    ) -> AppResult<ReservationStatus> {
        let mut tx = self.repository.store().begin().await?;

        let reservation = tx
            .reservation(borrower_id, book_stock_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No reservation for borrower {} on book stock {}",
                    borrower_id, book_stock_id
                ))
            })?;

        let loan_end_date = if reservation.queue_number == 0 {
            tx.book_stock(book_stock_id)
                .await?
                .and_then(|stock| stock.loan_end_date)
        } else {
            None
        };

        Ok(ReservationStatus::new(&reservation, borrower_id, loan_end_date))
    }

    /// Record a fine by hand
    pub async fn add_fine(&self, request: CreateLoanFine) -> AppResult<Uuid> {
        let mut tx = self.repository.store().begin().await?;

        tx.borrower(request.borrower_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Borrower {} not found", request.borrower_id))
        })?;
        tx.book_stock(request.book_stock_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Book stock {} not found", request.book_stock_id))
        })?;

        let mut fine = LoanFine::issue(request.borrower_id, request.book_stock_id);
        fine.active = request.active.unwrap_or(true);
        tx.insert_fine(&fine).await?;
        tx.commit().await?;

        tracing::info!("Fine {} added for borrower {}", fine.id, fine.borrower_id);

        Ok(fine.id)
    }
}

/// Remove `borrower_id`'s reservation on a copy and move the rest of the queue up
async fn fulfil_reservation(
    tx: &mut Box<dyn StoreTransaction>,
    book_stock_id: Uuid,
    borrower_id: Uuid,
) -> AppResult<()> {
    let queue = tx.reservations_for(book_stock_id).await?;

    let Some(fulfilled) = queue.iter().find(|r| r.borrower_id == Some(borrower_id)) else {
        return Ok(());
    };

    tx.delete_reservation(fulfilled.id).await?;
    for (id, queue_number) in close_queue_gap(&queue, fulfilled.queue_number) {
        tx.set_queue_number(id, queue_number).await?;
    }

    tracing::info!(
        "Reservation {} of borrower {} fulfilled for book stock {}",
        fulfilled.id,
        borrower_id,
        book_stock_id
    );
    Ok(())
}
