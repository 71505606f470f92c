//! Interactive menu session driving a ledger.
//!
//! The loop is generic over the input reader and output writer so scripted
//! sessions in tests share the exact code path the binary runs.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Result;

use crate::ledger::{LedgerError, sqlite::SqliteLedger};
use crate::record::{Book, BookDraft, HistoryEntry, UserDraft};

const MENU: &str = "\n1. Add book\n\
                    2. Register user\n\
                    3. Issue book\n\
                    4. Return book\n\
                    5. List available books\n\
                    6. Borrowing history\n\
                    7. Quit";

/// Runs the menu loop until quit, end of input, or a fatal storage error.
///
/// Recoverable ledger errors are rendered as one line and the menu
/// redisplays; only [`LedgerError::Storage`] (and I/O failure on the
/// session streams) aborts the session.
pub fn run_session<R: BufRead, W: Write>(
    ledger: &mut SqliteLedger,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        writeln!(out, "{MENU}")?;
        let Some(choice) = prompt(input, out, "Choose an action (1-7): ")? else {
            break;
        };
        match choice.as_str() {
            "1" => add_book(ledger, input, out)?,
            "2" => register_user(ledger, input, out)?,
            "3" => issue_book(ledger, input, out)?,
            "4" => return_book(ledger, input, out)?,
            "5" => list_available(ledger, out)?,
            "6" => show_history(ledger, out)?,
            "7" => break,
            other => writeln!(out, "Unknown choice: {other}")?,
        }
    }
    Ok(())
}

fn add_book<R: BufRead, W: Write>(
    ledger: &mut SqliteLedger,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let Some(title) = prompt(input, out, "Title: ")? else {
        return Ok(());
    };
    let Some(author) = prompt(input, out, "Author: ")? else {
        return Ok(());
    };
    let Some(year_raw) = prompt(input, out, "Publication year (blank if unknown): ")? else {
        return Ok(());
    };
    let Some(copies_raw) = prompt(input, out, "Copies: ")? else {
        return Ok(());
    };

    let year = match parse_optional_field::<i32>(&year_raw, "year") {
        Ok(v) => v,
        Err(err) => return report(out, err),
    };
    let copies = match parse_field::<u32>(&copies_raw, "copies") {
        Ok(v) => v,
        Err(err) => return report(out, err),
    };

    match ledger.add_book(BookDraft {
        title,
        author,
        year,
        copies,
    }) {
        Ok(id) => writeln!(out, "Book added with id {id}.")?,
        Err(err) => report(out, err)?,
    }
    Ok(())
}

fn register_user<R: BufRead, W: Write>(
    ledger: &mut SqliteLedger,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let Some(first_name) = prompt(input, out, "First name: ")? else {
        return Ok(());
    };
    let Some(last_name) = prompt(input, out, "Last name: ")? else {
        return Ok(());
    };
    let Some(email) = prompt(input, out, "Email: ")? else {
        return Ok(());
    };

    match ledger.register_user(UserDraft {
        first_name,
        last_name,
        email,
    }) {
        Ok(id) => writeln!(out, "User registered with id {id}.")?,
        Err(err) => report(out, err)?,
    }
    Ok(())
}

fn issue_book<R: BufRead, W: Write>(
    ledger: &mut SqliteLedger,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let Some(user_raw) = prompt(input, out, "User id: ")? else {
        return Ok(());
    };
    let Some(book_raw) = prompt(input, out, "Book id: ")? else {
        return Ok(());
    };

    let user_id = match parse_field::<i64>(&user_raw, "user id") {
        Ok(v) => v,
        Err(err) => return report(out, err),
    };
    let book_id = match parse_field::<i64>(&book_raw, "book id") {
        Ok(v) => v,
        Err(err) => return report(out, err),
    };

    match ledger.issue_book(user_id, book_id) {
        Ok(loan) => writeln!(
            out,
            "Book issued as borrowing {}. Due back on {}.",
            loan.id, loan.due_date
        )?,
        Err(err) => report(out, err)?,
    }
    Ok(())
}

fn return_book<R: BufRead, W: Write>(
    ledger: &mut SqliteLedger,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let Some(raw) = prompt(input, out, "Borrowing id: ")? else {
        return Ok(());
    };
    let borrowing_id = match parse_field::<i64>(&raw, "borrowing id") {
        Ok(v) => v,
        Err(err) => return report(out, err),
    };

    match ledger.return_book(borrowing_id) {
        Ok(loan) => writeln!(out, "Book {} returned.", loan.book_id)?,
        Err(err) => report(out, err)?,
    }
    Ok(())
}

fn list_available<W: Write>(ledger: &SqliteLedger, out: &mut W) -> Result<()> {
    match ledger.available_books() {
        Ok(books) if books.is_empty() => writeln!(out, "No books available.")?,
        Ok(books) => {
            for book in &books {
                writeln!(out, "{}", render_book(book))?;
            }
        }
        Err(err) => report(out, err)?,
    }
    Ok(())
}

fn show_history<W: Write>(ledger: &SqliteLedger, out: &mut W) -> Result<()> {
    match ledger.history() {
        Ok(entries) if entries.is_empty() => writeln!(out, "No borrowings recorded.")?,
        Ok(entries) => {
            for entry in &entries {
                writeln!(out, "{}", render_entry(entry))?;
            }
        }
        Err(err) => report(out, err)?,
    }
    Ok(())
}

fn render_book(book: &Book) -> String {
    let year = book
        .year
        .map_or_else(|| "unknown".to_string(), |y| y.to_string());
    format!(
        "ID: {}, Title: {}, Author: {}, Year: {}, Copies: {}",
        book.id, book.title, book.author, year, book.copies
    )
}

fn render_entry(entry: &HistoryEntry) -> String {
    format!(
        "Borrowing: {}, User: {} {}, Book: {}, Borrowed: {}, Due: {}, Status: {}",
        entry.borrowing_id,
        entry.first_name,
        entry.last_name,
        entry.title,
        entry.borrow_date,
        entry.due_date,
        entry.status.label()
    )
}

/// Renders a recoverable error as one line; propagates fatal ones.
fn report<W: Write>(out: &mut W, err: LedgerError) -> Result<()> {
    if err.is_fatal() {
        return Err(err.into());
    }
    writeln!(out, "Error: {err}")?;
    Ok(())
}

/// Prints `label` and reads one trimmed line. `None` means end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> std::io::Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_field<T: FromStr>(raw: &str, field: &str) -> Result<T, LedgerError> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::InvalidInput(format!("{field} must be an integer, got {raw:?}")))
}

fn parse_optional_field<T: FromStr>(raw: &str, field: &str) -> Result<Option<T>, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_field(trimmed, field).map(Some)
}
