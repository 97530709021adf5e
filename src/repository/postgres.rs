//! PostgreSQL store

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres, Transaction};
use uuid::Uuid;

use super::{LibraryStore, StoreTransaction};
use crate::{
    error::{AppError, AppResult},
    models::{BookStock, BookSummary, Borrower, CatalogueEntry, LoanFine, LoanReservation},
};

#[derive(Clone)]
pub struct PgLibraryStore {
    pool: Pool<Postgres>,
}

impl PgLibraryStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Flat row of the catalogue query
#[derive(FromRow)]
struct CatalogueRow {
    id: Uuid,
    loan_end_date: Option<NaiveDate>,
    book_id: Uuid,
    book_name: String,
    author_name: String,
    borrower_id: Option<Uuid>,
    borrower_name: Option<String>,
    borrower_email: Option<String>,
}

impl From<CatalogueRow> for CatalogueEntry {
    fn from(row: CatalogueRow) -> Self {
        let on_loan_to = match (row.borrower_id, row.borrower_name, row.borrower_email) {
            (Some(id), Some(name), Some(email_address)) => Some(Borrower {
                id,
                name,
                email_address,
            }),
            _ => None,
        };

        CatalogueEntry {
            id: row.id,
            book: BookSummary {
                id: row.book_id,
                name: row.book_name,
                author_name: row.author_name,
            },
            loan_end_date: row.loan_end_date,
            on_loan_to,
        }
    }
}

#[async_trait]
impl LibraryStore for PgLibraryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(one == 1)
    }

    async fn catalogue(&self) -> AppResult<Vec<CatalogueEntry>> {
        let rows = sqlx::query_as::<_, CatalogueRow>(
            r#"
            SELECT s.id, s.loan_end_date,
                   b.id AS book_id, b.name AS book_name, a.name AS author_name,
                   br.id AS borrower_id, br.name AS borrower_name,
                   br.email_address AS borrower_email
            FROM book_stock s
            JOIN books b ON b.id = s.book_id
            JOIN authors a ON a.id = b.author_id
            LEFT JOIN borrowers br ON br.id = s.on_loan_to
            ORDER BY b.name, s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogueEntry::from).collect())
    }

    async fn loan_fines(&self) -> AppResult<Vec<LoanFine>> {
        let fines = sqlx::query_as::<_, LoanFine>(
            "SELECT id, borrower_id, book_stock_id, active, created_at FROM loan_fines ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(fines)
    }

    async fn loan_reservations(&self) -> AppResult<Vec<LoanReservation>> {
        let reservations = sqlx::query_as::<_, LoanReservation>(
            r#"
            SELECT id, borrower_id, book_stock_id, queue_number
            FROM loan_reservations
            ORDER BY book_stock_id, queue_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }
}

/// One database transaction; rolled back by sqlx if dropped uncommitted
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

/// Unique violations come from concurrent queue updates racing each other
fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::InvalidState(
            "The reservation queue was changed concurrently, retry the request".to_string(),
        ),
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn book_stock(&mut self, id: Uuid) -> AppResult<Option<BookStock>> {
        let stock = sqlx::query_as::<_, BookStock>(
            "SELECT id, book_id, loan_end_date, on_loan_to FROM book_stock WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(stock)
    }

    async fn borrower(&mut self, id: Uuid) -> AppResult<Option<Borrower>> {
        let borrower = sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email_address FROM borrowers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(borrower)
    }

    async fn reservations_for(&mut self, book_stock_id: Uuid) -> AppResult<Vec<LoanReservation>> {
        let queue = sqlx::query_as::<_, LoanReservation>(
            r#"
            SELECT id, borrower_id, book_stock_id, queue_number
            FROM loan_reservations
            WHERE book_stock_id = $1
            ORDER BY queue_number
            "#,
        )
        .bind(book_stock_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(queue)
    }

    async fn reservation(
        &mut self,
        borrower_id: Uuid,
        book_stock_id: Uuid,
    ) -> AppResult<Option<LoanReservation>> {
        let reservation = sqlx::query_as::<_, LoanReservation>(
            r#"
            SELECT id, borrower_id, book_stock_id, queue_number
            FROM loan_reservations
            WHERE borrower_id = $1 AND book_stock_id = $2
            ORDER BY queue_number
            LIMIT 1
            "#,
        )
        .bind(borrower_id)
        .bind(book_stock_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(reservation)
    }

    async fn save_loan(&mut self, stock: &BookStock) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE book_stock SET on_loan_to = $1, loan_end_date = $2 WHERE id = $3",
        )
        .bind(stock.on_loan_to)
        .bind(stock.loan_end_date)
        .bind(stock.id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book stock {} not found", stock.id)));
        }
        Ok(())
    }

    async fn insert_fine(&mut self, fine: &LoanFine) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loan_fines (id, borrower_id, book_stock_id, active, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(fine.id)
        .bind(fine.borrower_id)
        .bind(fine.book_stock_id)
        .bind(fine.active)
        .bind(fine.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_reservation(&mut self, reservation: &LoanReservation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loan_reservations (id, borrower_id, book_stock_id, queue_number)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.borrower_id)
        .bind(reservation.book_stock_id)
        .bind(reservation.queue_number)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_reservation(&mut self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM loan_reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation {} not found", id)));
        }
        Ok(())
    }

    async fn set_queue_number(&mut self, id: Uuid, queue_number: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE loan_reservations SET queue_number = $1 WHERE id = $2")
            .bind(queue_number)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation {} not found", id)));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        // The queue constraint is deferred, so collisions surface here
        self.tx.commit().await.map_err(map_unique_violation)
    }
}
