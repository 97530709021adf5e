//! Repository layer: the store the services run their units of work against.
//!
//! [`LibraryStore`] hands out [`StoreTransaction`]s. Every write goes through
//! a transaction, and nothing is persisted unless [`StoreTransaction::commit`]
//! is called; dropping a transaction discards its changes.
//!
//! Two implementations exist:
//!
//! - [`postgres::PgLibraryStore`]: sqlx over PostgreSQL
//! - [`memory::MemoryLibraryStore`]: in-process, for tests and demo runs

pub mod memory;
pub mod postgres;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BookStock, Borrower, CatalogueEntry, LoanFine, LoanReservation},
};

/// Entry point to a library data store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;

    /// Check that the store can serve requests
    async fn health_check(&self) -> AppResult<bool>;

    /// All copies with their book, author and borrower
    async fn catalogue(&self) -> AppResult<Vec<CatalogueEntry>>;

    async fn loan_fines(&self) -> AppResult<Vec<LoanFine>>;

    /// All reservations, ordered by copy then queue number
    async fn loan_reservations(&self) -> AppResult<Vec<LoanReservation>>;
}

/// An open unit of work against the store
#[async_trait]
pub trait StoreTransaction: Send {
    /// Load a copy; the copy stays locked until the transaction ends
    async fn book_stock(&mut self, id: Uuid) -> AppResult<Option<BookStock>>;

    async fn borrower(&mut self, id: Uuid) -> AppResult<Option<Borrower>>;

    /// Reservations of a copy, ordered by queue number ascending
    async fn reservations_for(&mut self, book_stock_id: Uuid) -> AppResult<Vec<LoanReservation>>;

    async fn reservation(
        &mut self,
        borrower_id: Uuid,
        book_stock_id: Uuid,
    ) -> AppResult<Option<LoanReservation>>;

    /// Persist the loan fields (`on_loan_to`, `loan_end_date`) of a copy
    async fn save_loan(&mut self, stock: &BookStock) -> AppResult<()>;

    async fn insert_fine(&mut self, fine: &LoanFine) -> AppResult<()>;

    async fn insert_reservation(&mut self, reservation: &LoanReservation) -> AppResult<()>;

    async fn delete_reservation(&mut self, id: Uuid) -> AppResult<()>;

    async fn set_queue_number(&mut self, id: Uuid, queue_number: i32) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Shared handle on the configured store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn LibraryStore>,
}

impl Repository {
    /// Create a repository over the given store
    pub fn new(store: impl LibraryStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &dyn LibraryStore {
        self.store.as_ref()
    }
}
