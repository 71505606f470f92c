//! Shared identifier aliases and the loan-status enum.

use serde::{Deserialize, Serialize};

/// Auto-assigned book row identifier.
pub type BookId = i64;
/// Auto-assigned user row identifier.
pub type UserId = i64;
/// Auto-assigned borrowing row identifier.
pub type BorrowingId = i64;

/// Lifecycle state of a borrowing. One-way: a loan goes from
/// [`LoanStatus::Outstanding`] to [`LoanStatus::Returned`] exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// The copy is still out.
    Outstanding,
    /// The copy has come back.
    Returned,
}

impl LoanStatus {
    /// Derives the status from the stored returned flag.
    pub fn from_returned(returned: bool) -> Self {
        if returned {
            Self::Returned
        } else {
            Self::Outstanding
        }
    }

    /// Human-readable label used in history listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Returned => "returned",
            Self::Outstanding => "not returned",
        }
    }
}
