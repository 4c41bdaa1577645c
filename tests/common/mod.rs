#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use bible_hymnal::catalog::find_by_code;
use bible_hymnal::{AppPaths, Preferences, ReaderSession, StorePaths, Translation, TranslationStore};
use serde_json::json;
use tempfile::TempDir;

pub const GENESIS_1_1: &str = "No princípio criou Deus os céus e a terra.";

/// Temporary data and assets directories with a small seed.
pub struct Fixture {
    pub dir: TempDir,
    pub paths: AppPaths,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path().join("data"), dir.path().join("assets"));
        write_seed(&paths.seed_dir());
        Self { dir, paths }
    }

    pub fn without_seed() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path().join("data"), dir.path().join("assets"));
        Self { dir, paths }
    }

    pub fn store(&self) -> TranslationStore {
        TranslationStore::new(StorePaths::from(&self.paths))
    }

    pub fn session(&self) -> ReaderSession {
        let prefs = Preferences::open(&self.paths.preferences_file()).unwrap();
        ReaderSession::new(Arc::new(self.store()), Arc::new(prefs))
    }
}

pub fn translation(code: &str) -> Translation {
    find_by_code(code).unwrap()
}

/// Books use internal ids that differ from their reference ids so lookups
/// have to go through `book_reference_id`.
pub fn write_seed(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    let metadata = json!([{
        "name": "Almeida Corrigida Fiel",
        "version": "ACF",
        "copyright": "Domínio de teste",
        "permissions": "",
        "language_id": 1,
        "book_name_language": "pt"
    }]);
    let books = json!([
        {"id": 10, "book_reference_id": 43, "testament_reference_id": 2, "name": "João"},
        {"id": 1, "book_reference_id": 1, "testament_reference_id": 1, "name": "Gênesis"},
        {"id": 2, "book_reference_id": 2, "testament_reference_id": 1, "name": "Êxodo"}
    ]);
    let verses = json!([
        {"id": 1, "book_id": 1, "chapter": 1, "verse": 1, "text": GENESIS_1_1},
        {"id": 2, "book_id": 1, "chapter": 1, "verse": 2, "text": "E a terra era sem forma e vazia."},
        {"id": 3, "book_id": 1, "chapter": 2, "verse": 1, "text": "Assim os céus, a terra e todo o seu exército foram acabados."},
        {"id": 4, "book_id": 2, "chapter": 1, "verse": 1, "text": "Estes pois são os nomes dos filhos de Israel."},
        {"id": 5, "book_id": 10, "chapter": 3, "verse": 16, "text": "Porque Deus amou o mundo de tal maneira."}
    ]);
    fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
    fs::write(dir.join("books.json"), books.to_string()).unwrap();
    fs::write(dir.join("verses.json"), verses.to_string()).unwrap();
}
