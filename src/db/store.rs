//! Owner of the single open translation database.
//!
//! At most one handle is open at a time. Switching translations closes the
//! previous handle before the next one is opened, and the whole swap happens
//! under one mutex so overlapping switches run one after the other.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use super::books::{
    book_by_id, book_by_name, book_by_reference_id, fetch_book_names, fetch_books,
};
use super::error::{Lookup, StoreError};
use super::schema::create_schema;
use super::seed::{migrate_if_needed, MigrationOutcome};
use super::verses::{
    fetch_book_verses, fetch_chapter_numbers, fetch_chapter_verses, group_into_chapters, verse_at,
};
use crate::config::AppPaths;
use crate::models::{Book, Chapter, Translation, Verse};
use crate::reference::VerseRef;

/// Directories the store reads from and writes to.
#[derive(Debug, Clone)]
pub struct StorePaths {
    /// Writable working copies, one file per translation.
    pub databases_dir: PathBuf,
    /// Read-only prebuilt databases shipped with the assets.
    pub bundled_dir: PathBuf,
    /// Seed JSON used when a store has no metadata.
    pub seed_dir: PathBuf,
}

impl From<&AppPaths> for StorePaths {
    fn from(paths: &AppPaths) -> Self {
        Self {
            databases_dir: paths.databases_dir(),
            bundled_dir: paths.bundled_databases_dir(),
            seed_dir: paths.seed_dir(),
        }
    }
}

struct OpenHandle {
    translation: Translation,
    conn: Connection,
}

pub struct TranslationStore {
    paths: StorePaths,
    handle: Mutex<Option<OpenHandle>>,
}

impl TranslationStore {
    /// Create a store with no handle open.
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            handle: Mutex::new(None),
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn lock(&self) -> MutexGuard<'_, Option<OpenHandle>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `translation` the open store. Selecting the translation that is
    /// already open is a no-op. On failure no handle is left open.
    pub fn select_translation(&self, translation: &Translation) -> Result<(), StoreError> {
        let mut guard = self.lock();

        if let Some(open) = guard.as_ref() {
            if open.translation.file_name == translation.file_name {
                log::debug!("{} already open", translation.file_name);
                return Ok(());
            }
        }

        if let Some(previous) = guard.take() {
            close_handle(previous);
        }

        match self.open_handle(translation) {
            Ok(conn) => {
                log::info!("opened translation {}", translation.code);
                *guard = Some(OpenHandle {
                    translation: *translation,
                    conn,
                });
                Ok(())
            }
            Err(err) => {
                log::error!("failed to open translation {}: {err}", translation.code);
                Err(err)
            }
        }
    }

    fn open_handle(&self, translation: &Translation) -> Result<Connection, StoreError> {
        fs::create_dir_all(&self.paths.databases_dir)?;
        let path = self.paths.databases_dir.join(translation.file_name);
        let bundled = self.paths.bundled_dir.join(translation.file_name);
        copy_bundled_if_missing(&bundled, &path)?;

        let mut conn = match open_working_copy(&path) {
            Ok(conn) => conn,
            Err(err) if bundled.is_file() => {
                log::warn!(
                    "discarding unreadable working copy {}: {err}",
                    path.display()
                );
                fs::remove_file(&path)?;
                copy_bundled_if_missing(&bundled, &path)?;
                open_working_copy(&path)?
            }
            Err(err) => return Err(err),
        };

        // A failed migration rolls back and is retried on the next open; the
        // handle itself stays usable and simply shows an empty store.
        match migrate_if_needed(&mut conn, &self.paths.seed_dir) {
            Ok(MigrationOutcome::Seeded { books, verses }) => {
                log::info!("{}: migrated {books} books, {verses} verses", translation.code);
            }
            Ok(MigrationOutcome::Skipped) => {}
            Err(err) => log::error!("{}: seed migration failed: {err}", translation.code),
        }

        Ok(conn)
    }

    /// Translation whose handle is currently open.
    pub fn current_translation(&self) -> Option<Translation> {
        self.lock().as_ref().map(|open| open.translation)
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Close the open handle, if any.
    pub fn close(&self) {
        if let Some(previous) = self.lock().take() {
            close_handle(previous);
        }
    }

    /// Run `f` against the open handle, or fail with `Unavailable`.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self.lock();
        match guard.as_ref() {
            Some(open) => f(&open.conn),
            None => Err(StoreError::Unavailable),
        }
    }

    pub fn books(&self) -> Result<Vec<Book>, StoreError> {
        self.with_connection(|conn| Ok(fetch_books(conn)?))
    }

    pub fn book_names(&self) -> Result<Vec<String>, StoreError> {
        self.with_connection(|conn| Ok(fetch_book_names(conn)?))
    }

    pub fn book(&self, id: i64) -> Lookup<Book> {
        self.with_connection(|conn| Ok(book_by_id(conn, id)?)).into()
    }

    pub fn book_named(&self, name: &str) -> Lookup<Book> {
        self.with_connection(|conn| Ok(book_by_name(conn, name)?))
            .into()
    }

    pub fn book_for_reference(&self, book_reference_id: i64) -> Lookup<Book> {
        self.with_connection(|conn| Ok(book_by_reference_id(conn, book_reference_id)?))
            .into()
    }

    pub fn chapter_verses(&self, book_id: i64, chapter: i64) -> Result<Vec<Verse>, StoreError> {
        self.with_connection(|conn| Ok(fetch_chapter_verses(conn, book_id, chapter)?))
    }

    pub fn verse(&self, book_id: i64, chapter: i64, verse: i64) -> Lookup<Verse> {
        self.with_connection(|conn| Ok(verse_at(conn, book_id, chapter, verse)?))
            .into()
    }

    pub fn book_verses(&self, book_id: i64) -> Result<Vec<Verse>, StoreError> {
        self.with_connection(|conn| Ok(fetch_book_verses(conn, book_id)?))
    }

    pub fn chapters(&self, book_id: i64) -> Result<Vec<Chapter>, StoreError> {
        self.book_verses(book_id).map(group_into_chapters)
    }

    pub fn chapter_numbers(&self, book_id: i64) -> Result<Vec<i64>, StoreError> {
        self.with_connection(|conn| Ok(fetch_chapter_numbers(conn, book_id)?))
    }

    /// Resolve an external verse reference against the open translation.
    ///
    /// Malformed references and unknown abbreviations come back as
    /// `NotFound`, the same as a verse missing from this translation. The
    /// translation segment is not compared with the open translation.
    pub fn resolve(&self, external_id: &str) -> Lookup<Verse> {
        let reference = match VerseRef::parse(external_id) {
            Ok(reference) => reference,
            Err(err) => {
                log::warn!("cannot resolve verse reference '{external_id}': {err}");
                return Lookup::NotFound;
            }
        };
        self.resolve_ref(&reference)
    }

    pub fn resolve_ref(&self, reference: &VerseRef) -> Lookup<Verse> {
        self.with_connection(|conn| {
            let Some(book) = book_by_reference_id(conn, reference.book_reference_id)? else {
                return Ok(None);
            };
            Ok(verse_at(conn, book.id, reference.chapter, reference.verse)?)
        })
        .into()
    }
}

impl Drop for TranslationStore {
    fn drop(&mut self) {
        self.close();
    }
}

/// Close a handle, logging instead of propagating a failed close. The
/// connection is released either way.
fn close_handle(handle: OpenHandle) {
    let code = handle.translation.code;
    if let Err((_conn, err)) = handle.conn.close() {
        log::error!("failed to close translation {code}: {err}");
    } else {
        log::debug!("closed translation {code}");
    }
}

fn open_working_copy(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Copy the bundled database into place through a temporary file, so an
/// interrupted copy never leaves a partial working copy at `target`.
fn copy_bundled_if_missing(bundled: &Path, target: &Path) -> Result<(), StoreError> {
    if target.exists() || !bundled.is_file() {
        return Ok(());
    }
    log::info!(
        "copying bundled database {} to {}",
        bundled.display(),
        target.display()
    );
    let partial = partial_path(target);
    if let Err(err) = fs::copy(bundled, &partial).and_then(|_| fs::rename(&partial, target)) {
        let _ = fs::remove_file(&partial);
        return Err(err.into());
    }
    Ok(())
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
