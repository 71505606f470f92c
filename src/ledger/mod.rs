//! Ledger error taxonomy and loan policy.

pub mod sqlite;

use chrono::{Days, NaiveDate};

use crate::types::{BookId, BorrowingId, UserId};

/// Fixed loan period applied to every issued book. Not configurable.
pub const LOAN_PERIOD_DAYS: u64 = 14;

/// Computes the due date for a loan starting on `borrow_date`.
///
/// Calendar arithmetic, so month and year boundaries roll over correctly
/// (issuing on 2024-01-20 is due 2024-02-03).
pub fn due_date(borrow_date: NaiveDate) -> NaiveDate {
    borrow_date
        .checked_add_days(Days::new(LOAN_PERIOD_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Failure modes of ledger operations.
///
/// Everything except [`LedgerError::Storage`] is recoverable at the menu
/// loop: rendered as a one-line message, after which the menu redisplays.
#[derive(Debug)]
pub enum LedgerError {
    /// The email is already registered to another user.
    DuplicateEmail(String),
    /// No book exists with this id.
    BookNotFound(BookId),
    /// The book exists but has zero available copies.
    NoCopiesAvailable(BookId),
    /// No user exists with this id.
    UserNotFound(UserId),
    /// The borrowing is missing or already returned. The two conditions
    /// are not distinguished to the caller.
    BorrowingNotFoundOrReturned(BorrowingId),
    /// A field failed numeric coercion.
    InvalidInput(String),
    /// Underlying SQLite failure.
    Storage(rusqlite::Error),
}

impl LedgerError {
    /// True for errors that should abort the session rather than be
    /// rendered and retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail(email) => write!(f, "email {email} is already registered"),
            Self::BookNotFound(id) => write!(f, "book {id} not found"),
            Self::NoCopiesAvailable(id) => write!(f, "no copies of book {id} are available"),
            Self::UserNotFound(id) => write!(f, "user {id} not found"),
            Self::BorrowingNotFoundOrReturned(id) => {
                write!(f, "borrowing {id} not found or already returned")
            }
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value)
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
