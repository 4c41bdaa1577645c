use rusqlite::{params, Connection};

use crate::models::Testament;

/// Create the translation tables if they do not exist yet. Safe to call on
/// every open; bundled databases that already carry the tables are left alone.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS testament (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS book (
            id INTEGER PRIMARY KEY,
            book_reference_id INTEGER NOT NULL,
            testament_reference_id INTEGER NOT NULL,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS verse (
            id INTEGER PRIMARY KEY,
            book_id INTEGER NOT NULL,
            chapter INTEGER NOT NULL,
            verse INTEGER NOT NULL,
            text TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS verse_position
            ON verse (book_id, chapter, verse);

        CREATE INDEX IF NOT EXISTS book_reference
            ON book (book_reference_id);

        CREATE TABLE IF NOT EXISTS metadata (
            name TEXT PRIMARY KEY,
            version TEXT NOT NULL,
            copyright TEXT NOT NULL DEFAULT '',
            permissions TEXT NOT NULL DEFAULT '',
            language_id INTEGER NOT NULL DEFAULT 0,
            book_name_language TEXT NOT NULL DEFAULT ''
        );",
    )?;

    for testament in [Testament::Old, Testament::New] {
        conn.execute(
            "INSERT OR IGNORE INTO testament (id, name) VALUES (?1, ?2)",
            params![testament.reference_id(), testament.label()],
        )?;
    }

    Ok(())
}

/// Open an in-memory translation database with the full schema. Useful for
/// tests.
pub fn open_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}
