use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::Book;

const BOOK_COLUMNS: &str = "id, book_reference_id, testament_reference_id, name";

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        book_reference_id: row.get(1)?,
        testament_reference_id: row.get(2)?,
        name: row.get(3)?,
    })
}

/// Every book of the translation in canonical order.
pub fn fetch_books(conn: &Connection) -> rusqlite::Result<Vec<Book>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOK_COLUMNS} FROM book ORDER BY book_reference_id ASC, id ASC"
    ))?;
    let books = stmt
        .query_map([], book_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

pub fn fetch_book_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM book ORDER BY book_reference_id ASC, id ASC")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

pub fn book_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Book>> {
    conn.query_row(
        &format!("SELECT {BOOK_COLUMNS} FROM book WHERE id = ?1"),
        params![id],
        book_from_row,
    )
    .optional()
}

pub fn book_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Book>> {
    conn.query_row(
        &format!("SELECT {BOOK_COLUMNS} FROM book WHERE name = ?1 ORDER BY id LIMIT 1"),
        params![name],
        book_from_row,
    )
    .optional()
}

/// Map a canonical reference id to this translation's book row.
pub fn book_by_reference_id(
    conn: &Connection,
    book_reference_id: i64,
) -> rusqlite::Result<Option<Book>> {
    conn.query_row(
        &format!(
            "SELECT {BOOK_COLUMNS} FROM book WHERE book_reference_id = ?1 ORDER BY id LIMIT 1"
        ),
        params![book_reference_id],
        book_from_row,
    )
    .optional()
}
