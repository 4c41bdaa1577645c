//! One-time import of the bundled JSON seed into an empty translation store.
//!
//! The presence of any `metadata` row marks a store as seeded. The insert pass
//! runs inside a single transaction, so a failure leaves no metadata behind
//! and the next open retries from scratch.

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;

use super::error::SeedError;
use crate::models::{Book, Metadata, Verse};

pub const METADATA_FILE: &str = "metadata.json";
pub const BOOKS_FILE: &str = "books.json";
pub const VERSES_FILE: &str = "verses.json";

/// Parsed contents of the three seed files.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub metadata: Vec<Metadata>,
    pub books: Vec<Book>,
    pub verses: Vec<Verse>,
}

impl SeedData {
    /// Read and parse `metadata.json`, `books.json` and `verses.json` from `dir`.
    ///
    /// A seed without metadata rows is rejected: nothing would mark the store
    /// as seeded and the import would repeat on every open.
    pub fn load(dir: &Path) -> Result<Self, SeedError> {
        let metadata_path = dir.join(METADATA_FILE);
        let metadata: Vec<Metadata> = read_json(&metadata_path)?;
        if metadata.is_empty() {
            return Err(SeedError::MissingMetadata {
                path: metadata_path,
            });
        }
        Ok(Self {
            metadata,
            books: read_json(&dir.join(BOOKS_FILE))?,
            verses: read_json(&dir.join(VERSES_FILE))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Metadata was already present; nothing was read or written.
    Skipped,
    Seeded { books: usize, verses: usize },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SeedError> {
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn has_metadata(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row("SELECT EXISTS(SELECT 1 FROM metadata)", [], |row| row.get(0))
}

/// Insert every seed row with replace-on-conflict semantics in one
/// transaction. Running it twice leaves row counts unchanged.
pub fn insert_seed(conn: &mut Connection, data: &SeedData) -> Result<(), SeedError> {
    let tx = conn.transaction()?;
    {
        let mut insert_book = tx.prepare(
            "INSERT OR REPLACE INTO book (id, book_reference_id, testament_reference_id, name)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for book in &data.books {
            insert_book.execute(params![
                book.id,
                book.book_reference_id,
                book.testament_reference_id,
                book.name
            ])?;
        }

        let mut insert_verse = tx.prepare(
            "INSERT OR REPLACE INTO verse (id, book_id, chapter, verse, text)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for verse in &data.verses {
            insert_verse.execute(params![
                verse.id,
                verse.book_id,
                verse.chapter,
                verse.verse,
                verse.text
            ])?;
        }

        // Metadata goes last: it is the "seeded" marker.
        let mut insert_metadata = tx.prepare(
            "INSERT OR REPLACE INTO metadata
                (name, version, copyright, permissions, language_id, book_name_language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for meta in &data.metadata {
            insert_metadata.execute(params![
                meta.name,
                meta.version,
                meta.copyright,
                meta.permissions,
                meta.language_id,
                meta.book_name_language
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Seed the store from `seed_dir` unless it already carries metadata.
pub fn migrate_if_needed(
    conn: &mut Connection,
    seed_dir: &Path,
) -> Result<MigrationOutcome, SeedError> {
    if has_metadata(conn)? {
        return Ok(MigrationOutcome::Skipped);
    }

    log::info!("store has no metadata, seeding from {}", seed_dir.display());
    let data = SeedData::load(seed_dir)?;
    insert_seed(conn, &data)?;

    log::info!(
        "seeded {} books and {} verses",
        data.books.len(),
        data.verses.len()
    );
    Ok(MigrationOutcome::Seeded {
        books: data.books.len(),
        verses: data.verses.len(),
    })
}
