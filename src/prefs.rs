//! Key-value preference store backed by a small SQLite file, plus the four
//! favorite sets kept in it.
//!
//! String sets are stored as JSON arrays under stable keys, so adding an id
//! that is already present or removing one that is absent leaves the stored
//! value untouched.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

pub const SELECTED_TRANSLATION_KEY: &str = "selected_translation";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid stored value for '{key}': {source}")]
    Encoding {
        key: String,
        source: serde_json::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteKind {
    Music,
    Verse,
    Hymn,
    Score,
}

impl FavoriteKind {
    pub const ALL: [FavoriteKind; 4] = [
        FavoriteKind::Verse,
        FavoriteKind::Hymn,
        FavoriteKind::Score,
        FavoriteKind::Music,
    ];

    /// Preference key of the set. These strings are persisted; never change
    /// them.
    pub fn key(self) -> &'static str {
        match self {
            FavoriteKind::Music => "favorite_music_ids",
            FavoriteKind::Verse => "favorite_verse_ids",
            FavoriteKind::Hymn => "favorite_hymn_ids",
            FavoriteKind::Score => "favorite_score_ids",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FavoriteKind::Music => "Music",
            FavoriteKind::Verse => "Verses",
            FavoriteKind::Hymn => "Hymns",
            FavoriteKind::Score => "Scores",
        }
    }
}

pub struct Preferences {
    conn: Mutex<Connection>,
}

impl Preferences {
    pub fn open(path: &Path) -> Result<Self, PreferenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, PreferenceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, PreferenceError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        read_value(&self.lock(), key)
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        write_value(&self.lock(), key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.lock()
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn string_set(&self, key: &str) -> Result<BTreeSet<String>, PreferenceError> {
        read_set(&self.lock(), key)
    }

    pub fn favorites(&self, kind: FavoriteKind) -> Result<BTreeSet<String>, PreferenceError> {
        self.string_set(kind.key())
    }

    pub fn is_favorite(&self, kind: FavoriteKind, id: &str) -> Result<bool, PreferenceError> {
        Ok(self.favorites(kind)?.contains(id))
    }

    /// Add `id` to the set. Returns whether the set changed.
    pub fn add_favorite(&self, kind: FavoriteKind, id: &str) -> Result<bool, PreferenceError> {
        self.update_set(kind.key(), |set| set.insert(id.to_string()))
    }

    /// Remove `id` from the set. Returns whether the set changed.
    pub fn remove_favorite(&self, kind: FavoriteKind, id: &str) -> Result<bool, PreferenceError> {
        self.update_set(kind.key(), |set| set.remove(id))
    }

    /// Flip membership of `id`. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&self, kind: FavoriteKind, id: &str) -> Result<bool, PreferenceError> {
        let mut member = false;
        self.update_set(kind.key(), |set| {
            if set.remove(id) {
                member = false;
            } else {
                set.insert(id.to_string());
                member = true;
            }
            true
        })?;
        Ok(member)
    }

    /// Read-modify-write under the connection lock. The set is written back
    /// only when `change` reports a modification.
    fn update_set(
        &self,
        key: &str,
        change: impl FnOnce(&mut BTreeSet<String>) -> bool,
    ) -> Result<bool, PreferenceError> {
        let conn = self.lock();
        let mut set = read_set(&conn, key)?;
        if !change(&mut set) {
            return Ok(false);
        }
        let encoded = serde_json::to_string(&set).map_err(|source| PreferenceError::Encoding {
            key: key.to_string(),
            source,
        })?;
        write_value(&conn, key, &encoded)?;
        Ok(true)
    }
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>, PreferenceError> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<(), PreferenceError> {
    conn.execute(
        "INSERT INTO preferences (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn read_set(conn: &Connection, key: &str) -> Result<BTreeSet<String>, PreferenceError> {
    match read_value(conn, key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| PreferenceError::Encoding {
            key: key.to_string(),
            source,
        }),
        None => Ok(BTreeSet::new()),
    }
}
