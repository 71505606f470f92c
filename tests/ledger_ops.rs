use chrono::NaiveDate;

use shelfledger::{
    ledger::{LedgerError, due_date, sqlite::SqliteLedger},
    record::{BookDraft, UserDraft},
    types::LoanStatus,
};

fn book(title: &str, copies: u32) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        year: Some(1965),
        copies,
    }
}

fn user(email: &str) -> UserDraft {
    UserDraft {
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        email: email.to_string(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn listed_iff_copies_positive() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let out_of_stock = ledger.add_book(book("Empty Shelf", 0)).expect("add");
    let in_stock = ledger.add_book(book("Dune", 3)).expect("add");

    let listed: Vec<_> = ledger
        .available_books()
        .expect("list")
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(listed, vec![in_stock]);
    assert!(!listed.contains(&out_of_stock));
}

#[test]
fn empty_listings_are_valid_results() {
    let ledger = SqliteLedger::open_in_memory().expect("open");
    assert!(ledger.available_books().expect("list").is_empty());
    assert!(ledger.history().expect("history").is_empty());
}

#[test]
fn duplicate_email_rejected_without_second_row() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let first = ledger.register_user(user("ann@x.com")).expect("register");
    assert_eq!(first, 1);

    let dup = ledger.register_user(user("ann@x.com"));
    assert!(matches!(dup, Err(LedgerError::DuplicateEmail(email)) if email == "ann@x.com"));

    // The failed insert must not have consumed a row: the next distinct
    // email gets id 2.
    let second = ledger.register_user(user("bob@x.com")).expect("register");
    assert_eq!(second, 2);
}

#[test]
fn issue_validates_book_then_copies_then_user() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");

    let missing_book = ledger.issue_book(99, 77);
    assert!(matches!(missing_book, Err(LedgerError::BookNotFound(77))));

    let depleted = ledger.add_book(book("Empty Shelf", 0)).expect("add");
    let no_copies = ledger.issue_book(99, depleted);
    assert!(matches!(no_copies, Err(LedgerError::NoCopiesAvailable(id)) if id == depleted));

    let stocked = ledger.add_book(book("Dune", 1)).expect("add");
    let missing_user = ledger.issue_book(99, stocked);
    assert!(matches!(missing_user, Err(LedgerError::UserNotFound(99))));
}

#[test]
fn failed_issue_leaves_no_borrowing_and_copies_unchanged() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let book_id = ledger.add_book(book("Empty Shelf", 0)).expect("add");
    let user_id = ledger.register_user(user("ann@x.com")).expect("register");

    let issued = ledger.issue_book(user_id, book_id);
    assert!(matches!(issued, Err(LedgerError::NoCopiesAvailable(_))));

    assert_eq!(ledger.book(book_id).expect("query").expect("row").copies, 0);
    assert!(ledger.borrowing(1).expect("query").is_none());
    assert!(ledger.history().expect("history").is_empty());
}

#[test]
fn issue_then_return_restores_copies() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let book_id = ledger.add_book(book("Dune", 2)).expect("add");
    let user_id = ledger.register_user(user("ann@x.com")).expect("register");

    let loan = ledger.issue_book(user_id, book_id).expect("issue");
    assert!(!loan.returned);
    assert_eq!(loan.status(), LoanStatus::Outstanding);
    assert_eq!(ledger.book(book_id).expect("query").expect("row").copies, 1);

    let closed = ledger.return_book(loan.id).expect("return");
    assert!(closed.returned);
    assert_eq!(closed.status(), LoanStatus::Returned);
    assert_eq!(ledger.book(book_id).expect("query").expect("row").copies, 2);

    let stored = ledger.borrowing(loan.id).expect("query").expect("row");
    assert!(stored.returned);
}

#[test]
fn second_return_fails_and_increments_once() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let book_id = ledger.add_book(book("Dune", 2)).expect("add");
    let user_id = ledger.register_user(user("ann@x.com")).expect("register");

    let loan = ledger.issue_book(user_id, book_id).expect("issue");
    ledger.return_book(loan.id).expect("first return");

    let again = ledger.return_book(loan.id);
    assert!(matches!(
        again,
        Err(LedgerError::BorrowingNotFoundOrReturned(id)) if id == loan.id
    ));
    assert_eq!(ledger.book(book_id).expect("query").expect("row").copies, 2);
}

#[test]
fn return_of_unknown_borrowing_fails() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let missing = ledger.return_book(42);
    assert!(matches!(
        missing,
        Err(LedgerError::BorrowingNotFoundOrReturned(42))
    ));
}

#[test]
fn due_date_rolls_over_month_boundary() {
    assert_eq!(due_date(date(2024, 1, 20)), date(2024, 2, 3));
}

#[test]
fn due_date_handles_leap_february() {
    assert_eq!(due_date(date(2024, 2, 20)), date(2024, 3, 5));
}

#[test]
fn due_date_rolls_over_year_boundary() {
    assert_eq!(due_date(date(2023, 12, 25)), date(2024, 1, 8));
}

#[test]
fn issued_borrowing_stores_computed_due_date() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let book_id = ledger.add_book(book("Dune", 1)).expect("add");
    let user_id = ledger.register_user(user("ann@x.com")).expect("register");

    let loan = ledger
        .issue_book_on(user_id, book_id, date(2024, 1, 20))
        .expect("issue");
    assert_eq!(loan.borrow_date, date(2024, 1, 20));
    assert_eq!(loan.due_date, date(2024, 2, 3));

    let stored = ledger.borrowing(loan.id).expect("query").expect("row");
    assert_eq!(stored.borrow_date, date(2024, 1, 20));
    assert_eq!(stored.due_date, date(2024, 2, 3));
}

#[test]
fn history_is_ordered_by_borrowing_id_with_status_labels() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let dune = ledger.add_book(book("Dune", 2)).expect("add");
    let ann = ledger.register_user(user("ann@x.com")).expect("register");
    let bob = ledger.register_user(user("bob@x.com")).expect("register");

    let first = ledger
        .issue_book_on(ann, dune, date(2024, 3, 1))
        .expect("issue");
    let second = ledger
        .issue_book_on(bob, dune, date(2024, 3, 2))
        .expect("issue");
    ledger.return_book(first.id).expect("return");

    let history = ledger.history().expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].borrowing_id, first.id);
    assert_eq!(history[1].borrowing_id, second.id);
    assert_eq!(history[0].status, LoanStatus::Returned);
    assert_eq!(history[0].status.label(), "returned");
    assert_eq!(history[1].status, LoanStatus::Outstanding);
    assert_eq!(history[1].status.label(), "not returned");
    assert_eq!(history[0].title, "Dune");
    assert_eq!(history[1].first_name, "Ann");
    assert_eq!(history[1].last_name, "Lee");
}

#[test]
fn dune_scenario_end_to_end() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");

    let book_id = ledger
        .add_book(BookDraft {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: Some(1965),
            copies: 2,
        })
        .expect("add book");
    let user_id = ledger
        .register_user(UserDraft {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@x.com".to_string(),
        })
        .expect("register");

    let loan = ledger.issue_book(user_id, book_id).expect("issue");
    assert_eq!(ledger.book(book_id).expect("query").expect("row").copies, 1);

    let available = ledger.available_books().expect("list");
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].copies, 1);

    ledger.return_book(loan.id).expect("return");
    assert_eq!(ledger.book(book_id).expect("query").expect("row").copies, 2);
}

#[test]
fn book_without_year_round_trips_as_none() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    let id = ledger
        .add_book(BookDraft {
            title: "Epic of Gilgamesh".to_string(),
            author: "Unknown".to_string(),
            year: None,
            copies: 1,
        })
        .expect("add");
    assert_eq!(ledger.book(id).expect("query").expect("row").year, None);
}
