//! In-memory store.
//!
//! All data lives in a [`LibraryData`] behind an async mutex. A transaction
//! holds the mutex for its whole lifetime and works on a staged copy which
//! replaces the shared data on commit, so transactions are serialized and a
//! dropped transaction leaves no trace.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{LibraryStore, StoreTransaction};
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, Book, BookStock, BookSummary, Borrower, CatalogueEntry, LoanFine, LoanReservation,
    },
};

/// Plain collections backing the memory store
#[derive(Debug, Clone, Default)]
pub struct LibraryData {
    pub authors: IndexMap<Uuid, Author>,
    pub books: IndexMap<Uuid, Book>,
    pub borrowers: IndexMap<Uuid, Borrower>,
    pub book_stock: IndexMap<Uuid, BookStock>,
    pub fines: Vec<LoanFine>,
    pub reservations: Vec<LoanReservation>,
}

impl LibraryData {
    pub fn add_author(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.authors.insert(
            id,
            Author {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    pub fn add_book(&mut self, author_id: Uuid, name: &str, isbn: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.books.insert(
            id,
            Book {
                id,
                name: name.to_string(),
                author_id,
                format: Some("Paperback".to_string()),
                isbn: isbn.map(str::to_string),
            },
        );
        id
    }

    pub fn add_borrower(&mut self, name: &str, email_address: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.borrowers.insert(
            id,
            Borrower {
                id,
                name: name.to_string(),
                email_address: email_address.to_string(),
            },
        );
        id
    }

    /// Add an available copy of a book
    pub fn add_book_stock(&mut self, book_id: Uuid) -> Uuid {
        self.insert_book_stock(BookStock::new(book_id))
    }

    /// Add a copy as-is, e.g. one already on loan
    pub fn insert_book_stock(&mut self, stock: BookStock) -> Uuid {
        let id = stock.id;
        self.book_stock.insert(id, stock);
        id
    }

    /// Append a reservation at the tail of a copy's queue
    pub fn add_reservation(&mut self, book_stock_id: Uuid, borrower_id: Uuid) -> Uuid {
        let queue_number = self
            .reservations
            .iter()
            .filter(|r| r.book_stock_id == book_stock_id)
            .count() as i32;
        let id = Uuid::new_v4();
        self.reservations.push(LoanReservation {
            id,
            borrower_id: Some(borrower_id),
            book_stock_id,
            queue_number,
        });
        id
    }

    fn catalogue_entry(&self, stock: &BookStock) -> Option<CatalogueEntry> {
        let book = self.books.get(&stock.book_id)?;
        let author = self.authors.get(&book.author_id)?;
        Some(CatalogueEntry {
            id: stock.id,
            book: BookSummary {
                id: book.id,
                name: book.name.clone(),
                author_name: author.name.clone(),
            },
            loan_end_date: stock.loan_end_date,
            on_loan_to: stock
                .on_loan_to
                .and_then(|borrower_id| self.borrowers.get(&borrower_id).cloned()),
        })
    }

    /// Mirror of the deferred (book_stock_id, queue_number) unique constraint
    fn check_queue_numbers(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for r in &self.reservations {
            if !seen.insert((r.book_stock_id, r.queue_number)) {
                return Err(AppError::InvalidState(format!(
                    "Queue number {} is already taken for book stock {}",
                    r.queue_number, r.book_stock_id
                )));
            }
        }
        Ok(())
    }
}

/// Memory-backed [`LibraryStore`]
#[derive(Clone, Default)]
pub struct MemoryLibraryStore {
    data: Arc<Mutex<LibraryData>>,
}

impl MemoryLibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: LibraryData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Copy of the committed data
    pub async fn snapshot(&self) -> LibraryData {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl LibraryStore for MemoryLibraryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let guard = self.data.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn catalogue(&self) -> AppResult<Vec<CatalogueEntry>> {
        let data = self.data.lock().await;
        let entries = data
            .book_stock
            .values()
            .filter_map(|stock| {
                let entry = data.catalogue_entry(stock);
                if entry.is_none() {
                    tracing::warn!("Book stock {} references a missing book or author", stock.id);
                }
                entry
            })
            .collect();
        Ok(entries)
    }

    async fn loan_fines(&self) -> AppResult<Vec<LoanFine>> {
        Ok(self.data.lock().await.fines.clone())
    }

    async fn loan_reservations(&self) -> AppResult<Vec<LoanReservation>> {
        let mut reservations = self.data.lock().await.reservations.clone();
        reservations.sort_by_key(|r| (r.book_stock_id, r.queue_number));
        Ok(reservations)
    }
}

/// Unit of work over a staged copy of the data
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<LibraryData>,
    staged: LibraryData,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn book_stock(&mut self, id: Uuid) -> AppResult<Option<BookStock>> {
        Ok(self.staged.book_stock.get(&id).cloned())
    }

    async fn borrower(&mut self, id: Uuid) -> AppResult<Option<Borrower>> {
        Ok(self.staged.borrowers.get(&id).cloned())
    }

    async fn reservations_for(&mut self, book_stock_id: Uuid) -> AppResult<Vec<LoanReservation>> {
        let mut queue: Vec<LoanReservation> = self
            .staged
            .reservations
            .iter()
            .filter(|r| r.book_stock_id == book_stock_id)
            .cloned()
            .collect();
        queue.sort_by_key(|r| r.queue_number);
        Ok(queue)
    }

    async fn reservation(
        &mut self,
        borrower_id: Uuid,
        book_stock_id: Uuid,
    ) -> AppResult<Option<LoanReservation>> {
        Ok(self
            .staged
            .reservations
            .iter()
            .find(|r| r.book_stock_id == book_stock_id && r.borrower_id == Some(borrower_id))
            .cloned())
    }

    async fn save_loan(&mut self, stock: &BookStock) -> AppResult<()> {
        let stored = self
            .staged
            .book_stock
            .get_mut(&stock.id)
            .ok_or_else(|| AppError::NotFound(format!("Book stock {} not found", stock.id)))?;
        stored.on_loan_to = stock.on_loan_to;
        stored.loan_end_date = stock.loan_end_date;
        Ok(())
    }

    async fn insert_fine(&mut self, fine: &LoanFine) -> AppResult<()> {
        self.staged.fines.push(fine.clone());
        Ok(())
    }

    async fn insert_reservation(&mut self, reservation: &LoanReservation) -> AppResult<()> {
        self.staged.reservations.push(reservation.clone());
        Ok(())
    }

    async fn delete_reservation(&mut self, id: Uuid) -> AppResult<()> {
        let before = self.staged.reservations.len();
        self.staged.reservations.retain(|r| r.id != id);
        if self.staged.reservations.len() == before {
            return Err(AppError::NotFound(format!("Reservation {} not found", id)));
        }
        Ok(())
    }

    async fn set_queue_number(&mut self, id: Uuid, queue_number: i32) -> AppResult<()> {
        let reservation = self
            .staged
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;
        reservation.queue_number = queue_number;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        staged.check_queue_numbers()?;
        *guard = staged;
        Ok(())
    }
}
