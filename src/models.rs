//! Domain models that mirror the translation databases and the bundled hymnal.
//! These types stay light-weight data holders so the store, the reader session
//! and the TUI can pass them around freely.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// One scripture edition from the static catalog. Every translation is backed
/// by its own SQLite file whose name doubles as the identity of the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Translation {
    /// Short code used as the first segment of external verse references.
    pub code: &'static str,
    /// Human readable label shown in the translation picker.
    pub name: &'static str,
    /// File name of the backing database, e.g. `ACF.sqlite`.
    pub file_name: &'static str,
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Canonical testament classification. The numeric ids match the
/// `testament_reference_id` column of the `book` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn reference_id(self) -> i64 {
        match self {
            Testament::Old => 1,
            Testament::New => 2,
        }
    }

    pub fn from_reference_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Testament::Old),
            2 => Some(Testament::New),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Testament::Old => "Antigo Testamento",
            Testament::New => "Novo Testamento",
        }
    }
}

/// A named book inside one translation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Book {
    /// Translation specific primary key. Do not persist it outside the store;
    /// use `book_reference_id` to align books across translations.
    pub id: i64,
    /// Canonical position of the book (1 to 66), stable across translations.
    pub book_reference_id: i64,
    pub testament_reference_id: i64,
    pub name: String,
}

impl Book {
    pub fn testament(&self) -> Option<Testament> {
        Testament::from_reference_id(self.testament_reference_id)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single verse row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verse {
    pub id: i64,
    pub book_id: i64,
    pub chapter: i64,
    pub verse: i64,
    pub text: String,
}

/// Verses sharing a chapter number within one book. Chapters are never stored;
/// they are grouped from verse rows at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub book_id: i64,
    pub number: i64,
    pub verses: Vec<Verse>,
}

/// Descriptive row of the `metadata` table. Its presence marks a store as
/// seeded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub permissions: String,
    #[serde(default)]
    pub language_id: i64,
    #[serde(default)]
    pub book_name_language: String,
}

/// One entry of the bundled hymnal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hymn {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub lyrics: String,
}

impl Hymn {
    /// Opaque id used as the favorite key.
    pub fn favorite_id(&self) -> String {
        self.number.to_string()
    }

    pub fn display_title(&self) -> String {
        format!("{:03} - {}", self.number, self.title)
    }
}

/// A score (PDF) or music file discovered in the assets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// File name, used as the favorite key.
    pub id: String,
    /// File stem with separators turned into spaces.
    pub title: String,
    pub path: PathBuf,
}
