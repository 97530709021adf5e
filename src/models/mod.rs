//! Data models for the bookstock server

pub mod book;
pub mod book_stock;
pub mod borrower;
pub mod fine;
pub mod loan;
pub mod reservation;

// Re-export commonly used types
pub use book::{Author, Book, BookSummary};
pub use book_stock::{BookStock, CatalogueEntry, OnLoan};
pub use borrower::Borrower;
pub use fine::{CreateLoanFine, LoanFine};
pub use loan::{LoanUpdate, LoanUpdateResult};
pub use reservation::{CreateReservation, LoanReservation, ReservationStatus};
