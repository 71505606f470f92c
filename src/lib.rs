//! Single-user library ledger over a local SQLite store.
//!
//! The ledger tracks books, registered patrons, and borrow/return
//! transactions. Issuing a book decrements its available-copy count and
//! records a due date 14 calendar days out; returning it flips the loan
//! closed and restores the count. Every mutation runs in one SQLite
//! transaction.
//!
//! # Examples
//!
//! ```
//! use shelfledger::{
//!     ledger::sqlite::SqliteLedger,
//!     record::{BookDraft, UserDraft},
//! };
//!
//! let mut ledger = SqliteLedger::open_in_memory().expect("open");
//! let book_id = ledger
//!     .add_book(BookDraft {
//!         title: "Dune".to_string(),
//!         author: "Frank Herbert".to_string(),
//!         year: Some(1965),
//!         copies: 2,
//!     })
//!     .expect("add book");
//! let user_id = ledger
//!     .register_user(UserDraft {
//!         first_name: "Ann".to_string(),
//!         last_name: "Lee".to_string(),
//!         email: "ann@example.com".to_string(),
//!     })
//!     .expect("register user");
//!
//! let loan = ledger.issue_book(user_id, book_id).expect("issue");
//! assert_eq!(ledger.book(book_id).expect("query").expect("present").copies, 1);
//!
//! ledger.return_book(loan.id).expect("return");
//! assert_eq!(ledger.book(book_id).expect("query").expect("present").copies, 2);
//! ```
#![deny(missing_docs)]

/// Interactive menu session over a ledger.
pub mod cli;
/// Ledger operations, loan policy, and the SQLite backing store.
pub mod ledger;
/// Domain records and insert drafts.
pub mod record;
/// Shared id aliases and the loan-status enum.
pub mod types;
