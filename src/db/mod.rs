//! Persistence module split across logical submodules.

mod books;
mod error;
mod schema;
mod seed;
mod store;
mod verses;

pub use books::{book_by_id, book_by_name, book_by_reference_id, fetch_book_names, fetch_books};
pub use error::{Lookup, SeedError, StoreError};
pub use schema::{create_schema, open_memory};
pub use seed::{
    has_metadata, insert_seed, migrate_if_needed, MigrationOutcome, SeedData, BOOKS_FILE,
    METADATA_FILE, VERSES_FILE,
};
pub use store::{StorePaths, TranslationStore};
pub use verses::{
    fetch_book_verses, fetch_chapter_numbers, fetch_chapter_verses, group_into_chapters, verse_at,
};
