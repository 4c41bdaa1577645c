//! Core library surface for the Bible and hymnal reader.
//!
//! The persistence layer (`db`) owns the single open translation database and
//! its seed migration; `session` layers the reader's view state on top; `ui`
//! is the terminal front end used by the binary.
pub mod catalog;
pub mod config;
pub mod db;
pub mod hymnal;
pub mod media;
pub mod models;
pub mod observable;
pub mod prefs;
pub mod reference;
pub mod session;
pub mod ui;

pub use config::AppPaths;
pub use db::{Lookup, StoreError, StorePaths, TranslationStore};
pub use models::{Book, Chapter, Hymn, MediaItem, Translation, Verse};
pub use prefs::{FavoriteKind, Preferences};
pub use reference::VerseRef;
pub use session::{ChapterView, ReaderSession, VerseView};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
