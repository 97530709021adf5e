//! Demo catalogue for the memory backend

use chrono::{Duration, NaiveDate};

use super::memory::LibraryData;
use crate::models::BookStock;

/// A small library with copies on loan, one of them overdue, and a waiting list
pub fn demo_data(today: NaiveDate) -> LibraryData {
    let mut data = LibraryData::default();

    let le_guin = data.add_author("Ursula K. Le Guin");
    let lem = data.add_author("Stanislaw Lem");
    let jemisin = data.add_author("N. K. Jemisin");

    let dispossessed = data.add_book(le_guin, "The Dispossessed", Some("9780060512750"));
    let earthsea = data.add_book(le_guin, "A Wizard of Earthsea", Some("9780547773742"));
    let solaris = data.add_book(lem, "Solaris", Some("9780156027601"));
    let fifth_season = data.add_book(jemisin, "The Fifth Season", Some("9780316229296"));

    let grace = data.add_borrower("Grace Hopper", "grace@example.org");
    let alan = data.add_borrower("Alan Kay", "alan@example.org");
    let barbara = data.add_borrower("Barbara Liskov", "barbara@example.org");

    data.add_book_stock(dispossessed);
    data.add_book_stock(dispossessed);

    let mut on_loan = BookStock::new(earthsea);
    on_loan.lend_to(grace, today + Duration::days(14));
    let on_loan = data.insert_book_stock(on_loan);
    data.add_reservation(on_loan, alan);
    data.add_reservation(on_loan, barbara);

    let mut overdue = BookStock::new(solaris);
    overdue.lend_to(alan, today - Duration::days(3));
    data.insert_book_stock(overdue);

    let mut also_grace = BookStock::new(fifth_season);
    also_grace.lend_to(grace, today + Duration::days(7));
    data.insert_book_stock(also_grace);

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_data_is_consistent() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let data = demo_data(today);

        assert_eq!(data.book_stock.len(), 5);
        for stock in data.book_stock.values() {
            assert_eq!(stock.loan_end_date.is_some(), stock.on_loan_to.is_some());
            assert!(data.books.contains_key(&stock.book_id));
        }

        let mut queue: Vec<i32> = data.reservations.iter().map(|r| r.queue_number).collect();
        queue.sort();
        assert_eq!(queue, vec![0, 1]);
    }
}
