//! Library domain records and insert drafts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{BookId, BorrowingId, LoanStatus, UserId};

/// Catalogued book with its live available-copy count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Stable book identifier.
    pub id: BookId,
    /// Title text.
    pub title: String,
    /// Author text.
    pub author: String,
    /// Publication year, when known.
    pub year: Option<i32>,
    /// Physical copies currently available for issue.
    pub copies: u32,
}

/// Insert payload used to create a new [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    /// Title text.
    pub title: String,
    /// Author text.
    pub author: String,
    /// Publication year, when known.
    pub year: Option<i32>,
    /// Initial available-copy count.
    pub copies: u32,
}

/// Registered patron. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, unique across all users.
    pub email: String,
}

/// Insert payload used to create a new [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, unique across all users.
    pub email: String,
}

/// One loan of one physical copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    /// Stable borrowing identifier.
    pub id: BorrowingId,
    /// Borrowing user.
    pub user_id: UserId,
    /// Borrowed book.
    pub book_id: BookId,
    /// Date the copy went out.
    pub borrow_date: NaiveDate,
    /// Date the copy is due back.
    pub due_date: NaiveDate,
    /// True once the copy has come back.
    pub returned: bool,
}

impl Borrowing {
    /// Loan status derived from the returned flag.
    pub fn status(&self) -> LoanStatus {
        LoanStatus::from_returned(self.returned)
    }
}

/// Borrowing joined with patron name and book title for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Borrowing identifier.
    pub borrowing_id: BorrowingId,
    /// Borrowing user's given name.
    pub first_name: String,
    /// Borrowing user's family name.
    pub last_name: String,
    /// Borrowed book's title.
    pub title: String,
    /// Date the copy went out.
    pub borrow_date: NaiveDate,
    /// Date the copy is due back.
    pub due_date: NaiveDate,
    /// Loan status.
    pub status: LoanStatus,
}
