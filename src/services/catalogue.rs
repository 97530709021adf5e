//! Catalogue listings

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogueEntry, LoanFine, LoanReservation, OnLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogueService {
    repository: Repository,
}

impl CatalogueService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every copy with its book and current borrower
    pub async fn get_catalogue(&self) -> AppResult<Vec<CatalogueEntry>> {
        self.repository.store().catalogue().await
    }

    /// Copies on loan, grouped by borrower
    pub async fn get_on_loan(&self) -> AppResult<Vec<OnLoan>> {
        let catalogue = self.repository.store().catalogue().await?;
        Ok(group_by_borrower(catalogue))
    }

    pub async fn get_loan_fines(&self) -> AppResult<Vec<LoanFine>> {
        self.repository.store().loan_fines().await
    }

    pub async fn get_loan_reservations(&self) -> AppResult<Vec<LoanReservation>> {
        self.repository.store().loan_reservations().await
    }
}

/// Borrowers in order of first appearance in the catalogue
fn group_by_borrower(catalogue: Vec<CatalogueEntry>) -> Vec<OnLoan> {
    let mut groups: IndexMap<Uuid, OnLoan> = IndexMap::new();

    for entry in catalogue {
        let Some(borrower) = entry.on_loan_to else {
            continue;
        };
        groups
            .entry(borrower.id)
            .or_insert_with(|| OnLoan {
                borrower,
                book_names: Vec::new(),
            })
            .book_names
            .push(entry.book.name);
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::{LibraryData, MemoryLibraryStore};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_on_loan_groups_books_per_borrower() {
        let due = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let mut data = LibraryData::default();
        let author = data.add_author("N. K. Jemisin");
        let first = data.add_book(author, "The Fifth Season", None);
        let second = data.add_book(author, "The Obelisk Gate", None);
        let third = data.add_book(author, "The Stone Sky", None);
        let ann = data.add_borrower("Ann", "ann@example.org");
        let bob = data.add_borrower("Bob", "bob@example.org");

        for (book, borrower) in [(first, Some(ann)), (second, Some(bob)), (third, Some(ann))] {
            let stock = data.add_book_stock(book);
            if let Some(borrower) = borrower {
                data.book_stock[&stock].lend_to(borrower, due);
            }
        }
        data.add_book_stock(third);

        let service = CatalogueService::new(Repository::new(MemoryLibraryStore::with_data(data)));

        assert_eq!(service.get_catalogue().await.unwrap().len(), 4);

        let on_loan = service.get_on_loan().await.unwrap();
        assert_eq!(on_loan.len(), 2);
        assert_eq!(on_loan[0].borrower.id, ann);
        assert_eq!(on_loan[0].book_names, vec!["The Fifth Season", "The Stone Sky"]);
        assert_eq!(on_loan[1].borrower.id, bob);
        assert_eq!(on_loan[1].book_names, vec!["The Obelisk Gate"]);
    }

    #[tokio::test]
    async fn test_on_loan_empty_when_nothing_lent() {
        let mut data = LibraryData::default();
        let author = data.add_author("Stanislaw Lem");
        let book = data.add_book(author, "Solaris", None);
        data.add_book_stock(book);

        let service = CatalogueService::new(Repository::new(MemoryLibraryStore::with_data(data)));
        assert!(service.get_on_loan().await.unwrap().is_empty());
    }
}
