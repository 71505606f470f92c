//! SQLite-backed library ledger.

use std::path::Path;

use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::record::{Book, BookDraft, Borrowing, HistoryEntry, User, UserDraft};
use crate::types::{BookId, BorrowingId, LoanStatus, UserId};

use super::{LedgerError, LedgerResult, due_date};

/// Library ledger owning one scoped SQLite connection.
///
/// Constructed at startup, released on drop. Each mutation runs inside a
/// single transaction so the check-then-write on a book's copy count stays
/// atomic.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Opens or creates the ledger database at `path`.
    ///
    /// The three tables are created idempotently; WAL mode is enabled with
    /// `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory ledger, used by tests.
    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> LedgerResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// Adds a new book to the catalogue. Zero copies is allowed.
    pub fn add_book(&mut self, draft: BookDraft) -> LedgerResult<BookId> {
        self.conn.execute(
            "INSERT INTO books(title, author, year, copies) VALUES (?1, ?2, ?3, ?4)",
            params![draft.title, draft.author, draft.year, draft.copies],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(book_id = id, title = %draft.title, "book added");
        Ok(id)
    }

    /// Registers a new user.
    ///
    /// Fails with [`LedgerError::DuplicateEmail`] when the email is already
    /// present; no second row is created.
    pub fn register_user(&mut self, draft: UserDraft) -> LedgerResult<UserId> {
        let inserted = self.conn.execute(
            "INSERT INTO users(first_name, last_name, email) VALUES (?1, ?2, ?3)",
            params![draft.first_name, draft.last_name, draft.email],
        );
        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(user_id = id, "user registered");
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => Err(LedgerError::DuplicateEmail(draft.email)),
            Err(err) => Err(err.into()),
        }
    }

    /// Issues a book to a user as of the current local date.
    pub fn issue_book(&mut self, user_id: UserId, book_id: BookId) -> LedgerResult<Borrowing> {
        self.issue_book_on(user_id, book_id, Local::now().date_naive())
    }

    /// Issues a book with an explicit borrow date.
    ///
    /// Validates, in order: the book exists, it has at least one available
    /// copy, the user exists. On success inserts the borrowing and
    /// decrements the copy count in the same transaction. The due date is
    /// `borrow_date` plus [`super::LOAN_PERIOD_DAYS`] calendar days.
    pub fn issue_book_on(
        &mut self,
        user_id: UserId,
        book_id: BookId,
        borrow_date: NaiveDate,
    ) -> LedgerResult<Borrowing> {
        let tx = self.conn.transaction()?;

        let copies: Option<u32> = tx
            .query_row(
                "SELECT copies FROM books WHERE id = ?1",
                params![book_id],
                |row| row.get(0),
            )
            .optional()?;
        let copies = copies.ok_or(LedgerError::BookNotFound(book_id))?;
        if copies == 0 {
            return Err(LedgerError::NoCopiesAvailable(book_id));
        }

        let user_exists: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        if user_exists.is_none() {
            return Err(LedgerError::UserNotFound(user_id));
        }

        let due = due_date(borrow_date);
        tx.execute(
            "INSERT INTO borrowings(user_id, book_id, borrow_date, due_date, returned) \
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![user_id, book_id, borrow_date, due],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE books SET copies = copies - 1 WHERE id = ?1",
            params![book_id],
        )?;
        tx.commit()?;

        debug!(borrowing_id = id, user_id, book_id, due = %due, "book issued");
        Ok(Borrowing {
            id,
            user_id,
            book_id,
            borrow_date,
            due_date: due,
            returned: false,
        })
    }

    /// Closes an active borrowing and restores the book's copy count.
    ///
    /// Fails with [`LedgerError::BorrowingNotFoundOrReturned`] when the row
    /// is missing or already returned; the copy count is untouched in that
    /// case.
    pub fn return_book(&mut self, borrowing_id: BorrowingId) -> LedgerResult<Borrowing> {
        let tx = self.conn.transaction()?;

        let found = tx
            .query_row(
                "SELECT id, user_id, book_id, borrow_date, due_date, returned \
                 FROM borrowings WHERE id = ?1 AND returned = 0",
                params![borrowing_id],
                map_borrowing,
            )
            .optional()?;
        let mut borrowing =
            found.ok_or(LedgerError::BorrowingNotFoundOrReturned(borrowing_id))?;

        tx.execute(
            "UPDATE borrowings SET returned = 1 WHERE id = ?1",
            params![borrowing_id],
        )?;
        tx.execute(
            "UPDATE books SET copies = copies + 1 WHERE id = ?1",
            params![borrowing.book_id],
        )?;
        tx.commit()?;

        borrowing.returned = true;
        debug!(borrowing_id, book_id = borrowing.book_id, "book returned");
        Ok(borrowing)
    }

    /// Lists every book with at least one available copy, ascending id.
    ///
    /// An empty vec is a valid result, distinct from any not-found error.
    pub fn available_books(&self) -> LedgerResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, author, year, copies FROM books \
             WHERE copies > 0 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], map_book)?;
        collect(rows)
    }

    /// Lists every borrowing joined with patron name and book title,
    /// ascending borrowing id.
    pub fn history(&self) -> LedgerResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT bo.id, u.first_name, u.last_name, b.title, \
                    bo.borrow_date, bo.due_date, bo.returned \
             FROM borrowings bo \
             JOIN users u ON bo.user_id = u.id \
             JOIN books b ON bo.book_id = b.id \
             ORDER BY bo.id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(HistoryEntry {
                borrowing_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                title: row.get(3)?,
                borrow_date: row.get(4)?,
                due_date: row.get(5)?,
                status: LoanStatus::from_returned(row.get(6)?),
            })
        })?;
        collect(rows)
    }

    /// Fetches one book by id.
    pub fn book(&self, id: BookId) -> LedgerResult<Option<Book>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, title, author, year, copies FROM books WHERE id = ?1",
                params![id],
                map_book,
            )
            .optional()?;
        Ok(found)
    }

    /// Fetches one user by id.
    pub fn user(&self, id: UserId) -> LedgerResult<Option<User>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, email FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// Fetches one borrowing by id, regardless of its returned flag.
    pub fn borrowing(&self, id: BorrowingId) -> LedgerResult<Option<Borrowing>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, user_id, book_id, borrow_date, due_date, returned \
                 FROM borrowings WHERE id = ?1",
                params![id],
                map_borrowing,
            )
            .optional()?;
        Ok(found)
    }
}

fn map_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        copies: row.get(4)?,
    })
}

fn map_borrowing(row: &Row<'_>) -> rusqlite::Result<Borrowing> {
    Ok(Borrowing {
        id: row.get(0)?,
        user_id: row.get(1)?,
        book_id: row.get(2)?,
        borrow_date: row.get(3)?,
        due_date: row.get(4)?,
        returned: row.get(5)?,
    })
}

fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> LedgerResult<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
