use bible_hymnal::prefs::SELECTED_TRANSLATION_KEY;
use bible_hymnal::{FavoriteKind, Preferences};

#[test]
fn adding_twice_keeps_one_entry() {
    let prefs = Preferences::open_in_memory().unwrap();

    assert!(prefs.add_favorite(FavoriteKind::Hymn, "15").unwrap());
    assert!(!prefs.add_favorite(FavoriteKind::Hymn, "15").unwrap());

    let hymns = prefs.favorites(FavoriteKind::Hymn).unwrap();
    assert_eq!(hymns.len(), 1);
    assert!(hymns.contains("15"));
}

#[test]
fn removing_an_absent_id_changes_nothing() {
    let prefs = Preferences::open_in_memory().unwrap();
    prefs.add_favorite(FavoriteKind::Score, "castelo_forte.pdf").unwrap();

    assert!(!prefs.remove_favorite(FavoriteKind::Score, "outro.pdf").unwrap());
    assert_eq!(prefs.favorites(FavoriteKind::Score).unwrap().len(), 1);

    assert!(prefs.remove_favorite(FavoriteKind::Score, "castelo_forte.pdf").unwrap());
    assert!(prefs.favorites(FavoriteKind::Score).unwrap().is_empty());
}

#[test]
fn favorite_sets_are_independent() {
    let prefs = Preferences::open_in_memory().unwrap();
    prefs.add_favorite(FavoriteKind::Verse, "ACF_GN_1_1").unwrap();
    prefs.add_favorite(FavoriteKind::Music, "hino.mp3").unwrap();

    assert!(prefs.is_favorite(FavoriteKind::Verse, "ACF_GN_1_1").unwrap());
    assert!(!prefs.is_favorite(FavoriteKind::Music, "ACF_GN_1_1").unwrap());
    assert!(prefs.favorites(FavoriteKind::Hymn).unwrap().is_empty());
    assert!(prefs.favorites(FavoriteKind::Score).unwrap().is_empty());
}

#[test]
fn toggle_flips_membership() {
    let prefs = Preferences::open_in_memory().unwrap();
    assert!(prefs.toggle_favorite(FavoriteKind::Music, "a.mp3").unwrap());
    assert!(prefs.is_favorite(FavoriteKind::Music, "a.mp3").unwrap());
    assert!(!prefs.toggle_favorite(FavoriteKind::Music, "a.mp3").unwrap());
    assert!(!prefs.is_favorite(FavoriteKind::Music, "a.mp3").unwrap());
}

#[test]
fn values_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("preferences.sqlite");
    {
        let prefs = Preferences::open(&path).unwrap();
        prefs.set_string(SELECTED_TRANSLATION_KEY, "NVI").unwrap();
        prefs.add_favorite(FavoriteKind::Verse, "NVI_JO_3_16").unwrap();
    }

    let prefs = Preferences::open(&path).unwrap();
    assert_eq!(
        prefs.get_string(SELECTED_TRANSLATION_KEY).unwrap().as_deref(),
        Some("NVI")
    );
    assert!(prefs.is_favorite(FavoriteKind::Verse, "NVI_JO_3_16").unwrap());
}

#[test]
fn stored_keys_are_stable() {
    let prefs = Preferences::open_in_memory().unwrap();
    prefs.add_favorite(FavoriteKind::Hymn, "1").unwrap();
    assert_eq!(
        prefs.get_string("favorite_hymn_ids").unwrap().as_deref(),
        Some("[\"1\"]")
    );
    prefs.remove("favorite_hymn_ids").unwrap();
    assert!(prefs.favorites(FavoriteKind::Hymn).unwrap().is_empty());
}
