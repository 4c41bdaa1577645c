mod common;

use std::fs;
use std::sync::Arc;
use std::thread;

use bible_hymnal::db::{create_schema, StoreError};
use bible_hymnal::Lookup;
use common::{translation, Fixture, GENESIS_1_1};
use rusqlite::Connection;

#[test]
fn selecting_a_translation_seeds_and_lists_books_in_canonical_order() {
    let fixture = Fixture::new();
    let store = fixture.store();
    assert!(!store.is_open());

    store.select_translation(&translation("ACF")).unwrap();

    assert_eq!(store.current_translation().map(|t| t.code), Some("ACF"));
    assert_eq!(store.book_names().unwrap(), vec!["Gênesis", "Êxodo", "João"]);
    assert!(fixture.paths.databases_dir().join("ACF.sqlite").is_file());
}

#[test]
fn resolves_external_reference_to_verse_text() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    let verse = store.resolve("ACF_GN_1_1").found().unwrap();
    assert_eq!(verse.text, GENESIS_1_1);
    assert_eq!((verse.book_id, verse.chapter, verse.verse), (1, 1, 1));
}

#[test]
fn resolution_maps_reference_id_to_internal_book_key() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    let verse = store.resolve("ACF_JO_3_16").found().unwrap();
    assert_eq!(verse.book_id, 10);
    assert!(verse.text.starts_with("Porque Deus amou"));

    let five_segments = store.resolve("ACF_JO_3_16_5").found().unwrap();
    assert_eq!(five_segments, verse);
}

#[test]
fn malformed_and_unknown_references_are_not_found() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    for id in [
        "ACF_XX_1_1",
        "ACF_GN_1",
        "ACF_GN_1_1_1_1",
        "ACF_GN_a_1",
        "ACF_GN_1_-1",
        "",
        "ACF_GN_9_9",
        "ACF_GN_+1_01",
        "ACF_AP_1_1",
    ] {
        assert!(
            matches!(store.resolve(id), Lookup::NotFound),
            "{id} should not resolve"
        );
    }
}

#[test]
fn queries_without_an_open_handle_return_unavailable() {
    let fixture = Fixture::new();
    let store = fixture.store();

    assert!(matches!(store.books(), Err(StoreError::Unavailable)));
    assert!(matches!(
        store.chapter_verses(1, 1),
        Err(StoreError::Unavailable)
    ));
    assert!(matches!(
        store.resolve("ACF_GN_1_1"),
        Lookup::Failed(StoreError::Unavailable)
    ));
    assert!(store.book(1).found().is_none());
}

#[test]
fn missing_chapter_is_an_empty_list() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    assert!(store.chapter_verses(1, 50).unwrap().is_empty());
    assert!(store.chapter_verses(999, 1).unwrap().is_empty());
}

#[test]
fn book_lookups_by_key_name_and_reference() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    let by_name = store.book_named("João").found().unwrap();
    assert_eq!(by_name.id, 10);
    assert_eq!(store.book(10).found(), Some(by_name.clone()));
    assert_eq!(store.book_for_reference(43).found(), Some(by_name));
    assert!(matches!(store.book_named("Tobias"), Lookup::NotFound));
}

#[test]
fn verses_for_a_book_group_into_chapters() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    let verses = store.book_verses(1).unwrap();
    let positions: Vec<(i64, i64)> = verses.iter().map(|v| (v.chapter, v.verse)).collect();
    assert_eq!(positions, vec![(1, 1), (1, 2), (2, 1)]);

    let chapters = store.chapters(1).unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].verses.len(), 2);
    assert_eq!(store.chapter_numbers(1).unwrap(), vec![1, 2]);
    assert_eq!(
        store.verse(1, 1, 2).found().map(|v| v.id),
        Some(2)
    );
}

#[test]
fn switching_away_and_back_yields_the_same_books() {
    let fixture = Fixture::new();
    let store = fixture.store();

    store.select_translation(&translation("ACF")).unwrap();
    let first = store.books().unwrap();

    store.select_translation(&translation("ARA")).unwrap();
    assert_eq!(store.current_translation().map(|t| t.code), Some("ARA"));

    store.select_translation(&translation("ACF")).unwrap();
    assert_eq!(store.books().unwrap(), first);
}

#[test]
fn reselecting_the_open_translation_keeps_the_handle() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();
    store.select_translation(&translation("ACF")).unwrap();
    assert_eq!(store.current_translation().map(|t| t.code), Some("ACF"));
    assert_eq!(store.books().unwrap().len(), 3);
}

#[test]
fn failed_open_leaves_no_handle() {
    let fixture = Fixture::new();
    fs::create_dir_all(fixture.paths.data_dir()).unwrap();
    // A regular file where the databases directory should be.
    fs::write(fixture.paths.databases_dir(), b"not a directory").unwrap();

    let store = fixture.store();
    assert!(store.select_translation(&translation("ACF")).is_err());
    assert!(!store.is_open());
    assert!(matches!(store.book_names(), Err(StoreError::Unavailable)));
}

#[test]
fn failed_open_closes_the_previous_handle() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    fs::remove_dir_all(fixture.paths.databases_dir()).unwrap();
    fs::write(fixture.paths.databases_dir(), b"not a directory").unwrap();

    assert!(store.select_translation(&translation("NVI")).is_err());
    assert!(store.current_translation().is_none());
}

fn write_bundled_kjv(fixture: &Fixture) -> std::path::PathBuf {
    let bundled_dir = fixture.paths.bundled_databases_dir();
    fs::create_dir_all(&bundled_dir).unwrap();
    let path = bundled_dir.join("KJV.sqlite");
    let conn = Connection::open(&path).unwrap();
    create_schema(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO book (id, book_reference_id, testament_reference_id, name)
             VALUES (1, 1, 1, 'Genesis');
         INSERT INTO verse (id, book_id, chapter, verse, text)
             VALUES (1, 1, 1, 1, 'In the beginning God created the heaven and the earth.');
         INSERT INTO metadata (name, version) VALUES ('King James Version', 'KJV');",
    )
    .unwrap();
    conn.close().unwrap();
    path
}

#[test]
fn bundled_database_is_copied_instead_of_seeded() {
    let fixture = Fixture::new();
    write_bundled_kjv(&fixture);

    let store = fixture.store();
    store.select_translation(&translation("KJV")).unwrap();

    assert_eq!(store.book_names().unwrap(), vec!["Genesis"]);
    assert!(store
        .resolve("KJV_GN_1_1")
        .found()
        .unwrap()
        .text
        .starts_with("In the beginning"));
    assert!(fixture.paths.databases_dir().join("KJV.sqlite").is_file());
    assert!(!fixture.paths.databases_dir().join("KJV.sqlite.tmp").exists());
}

#[test]
fn truncated_working_copy_is_replaced_from_the_bundle() {
    let fixture = Fixture::new();
    let bundled = write_bundled_kjv(&fixture);

    let databases_dir = fixture.paths.databases_dir();
    fs::create_dir_all(&databases_dir).unwrap();
    let bytes = fs::read(&bundled).unwrap();
    fs::write(databases_dir.join("KJV.sqlite"), &bytes[..100]).unwrap();

    let store = fixture.store();
    store.select_translation(&translation("KJV")).unwrap();

    assert!(store.is_open());
    assert_eq!(store.book_names().unwrap(), vec!["Genesis"]);
    assert_eq!(
        fs::metadata(databases_dir.join("KJV.sqlite")).unwrap().len(),
        bytes.len() as u64
    );
}

#[test]
fn store_without_seed_opens_empty() {
    let fixture = Fixture::without_seed();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();

    assert!(store.is_open());
    assert!(store.books().unwrap().is_empty());
    assert!(matches!(store.resolve("ACF_GN_1_1"), Lookup::NotFound));
}

#[test]
fn overlapping_switches_leave_exactly_one_open_handle() {
    let fixture = Fixture::new();
    let store = Arc::new(fixture.store());

    let handles: Vec<_> = ["ACF", "ARA", "NVI", "ACF", "KJV"]
        .into_iter()
        .map(|code| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.select_translation(&translation(code)).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert!(store.current_translation().is_some());
    assert_eq!(store.book_names().unwrap().len(), 3);
}

#[test]
fn close_releases_the_handle() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store.select_translation(&translation("ACF")).unwrap();
    store.close();
    assert!(!store.is_open());
    assert!(matches!(store.books(), Err(StoreError::Unavailable)));
}
