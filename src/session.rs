//! Reader session: the view state of the Bible reader on top of the
//! translation store.
//!
//! Failures stop here. Store errors are logged and shown as empty lists or
//! missing values, which is what every screen renders as "nothing to show".
//! Callers that need to tell the cases apart use the `Lookup` returned by
//! `open_reference`.

use std::sync::{Arc, Mutex, PoisonError};

use crate::catalog::{default_translation, find_by_code};
use crate::db::{Lookup, StoreError, TranslationStore};
use crate::models::{Book, Translation, Verse};
use crate::observable::Observable;
use crate::prefs::{FavoriteKind, PreferenceError, Preferences, SELECTED_TRANSLATION_KEY};
use crate::reference::VerseRef;

/// Verses of the chapter on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterView {
    pub book: Book,
    pub chapter: i64,
    pub verses: Vec<Verse>,
}

/// A verse together with what is needed to display and bookmark it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseView {
    pub translation: Translation,
    pub book: Book,
    pub verse: Verse,
    /// Canonical external reference, e.g. `ACF_GN_1_1`.
    pub reference: String,
}

impl VerseView {
    pub fn citation(&self) -> String {
        format!(
            "{} {}:{} ({})",
            self.book.name, self.verse.chapter, self.verse.verse, self.translation.code
        )
    }
}

pub struct ReaderSession {
    store: Arc<TranslationStore>,
    prefs: Arc<Preferences>,
    switch_lock: Mutex<()>,
    translation: Observable<Option<Translation>>,
    book_names: Observable<Vec<String>>,
    book: Observable<Option<Book>>,
    chapter_numbers: Observable<Vec<i64>>,
    chapter: Observable<Option<ChapterView>>,
    verse_favorite: Observable<bool>,
}

impl ReaderSession {
    pub fn new(store: Arc<TranslationStore>, prefs: Arc<Preferences>) -> Self {
        Self {
            store,
            prefs,
            switch_lock: Mutex::new(()),
            translation: Observable::new(None),
            book_names: Observable::new(Vec::new()),
            book: Observable::new(None),
            chapter_numbers: Observable::new(Vec::new()),
            chapter: Observable::new(None),
            verse_favorite: Observable::distinct(false),
        }
    }

    pub fn store(&self) -> &TranslationStore {
        &self.store
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn translation(&self) -> &Observable<Option<Translation>> {
        &self.translation
    }

    pub fn book_names(&self) -> &Observable<Vec<String>> {
        &self.book_names
    }

    pub fn book(&self) -> &Observable<Option<Book>> {
        &self.book
    }

    pub fn chapter_numbers(&self) -> &Observable<Vec<i64>> {
        &self.chapter_numbers
    }

    pub fn chapter(&self) -> &Observable<Option<ChapterView>> {
        &self.chapter
    }

    /// Favorite flag of the focused verse. Consecutive equal values are
    /// dropped.
    pub fn verse_favorite(&self) -> &Observable<bool> {
        &self.verse_favorite
    }

    /// Switch to `translation`. Dependent state is cleared before the store
    /// switches, then the book list is repopulated from the new handle.
    /// Overlapping calls run one after the other. Returns whether the
    /// translation is open afterwards.
    pub fn select_translation(&self, translation: Translation) -> bool {
        let _switching = self.switch_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.reset_reading_state();
        self.book_names.set(Vec::new());

        if self.store.select_translation(&translation).is_err() {
            // The store already logged the cause.
            self.translation.set(None);
            return false;
        }
        self.translation.set(Some(translation));

        if let Err(err) = self.prefs.set_string(SELECTED_TRANSLATION_KEY, translation.code) {
            log::warn!("could not remember translation {}: {err}", translation.code);
        }

        let names = show_nothing(self.store.book_names(), "book names");
        self.book_names.set(names);
        true
    }

    /// Reopen the translation chosen in a previous run, or the default one.
    pub fn restore_translation(&self) -> bool {
        let remembered = match self.prefs.get_string(SELECTED_TRANSLATION_KEY) {
            Ok(code) => code.and_then(|code| find_by_code(&code)),
            Err(err) => {
                log::warn!("could not read remembered translation: {err}");
                None
            }
        };
        self.select_translation(remembered.unwrap_or_else(default_translation))
    }

    fn reset_reading_state(&self) {
        self.book.set(None);
        self.chapter_numbers.set(Vec::new());
        self.chapter.set(None);
        self.verse_favorite.set(false);
    }

    /// Load a book by its display name in the open translation.
    pub fn open_book(&self, name: &str) -> Option<Book> {
        let book = self.store.book_named(name).found();
        self.show_book(book.clone());
        book
    }

    pub fn open_book_by_id(&self, id: i64) -> Option<Book> {
        let book = self.store.book(id).found();
        self.show_book(book.clone());
        book
    }

    fn show_book(&self, book: Option<Book>) {
        self.chapter.set(None);
        self.verse_favorite.set(false);
        let chapters = match &book {
            Some(book) => show_nothing(self.store.chapter_numbers(book.id), "chapter list"),
            None => Vec::new(),
        };
        self.book.set(book);
        self.chapter_numbers.set(chapters);
    }

    /// Load a chapter of the open book. Without an open book nothing happens.
    pub fn open_chapter(&self, chapter: i64) -> Option<ChapterView> {
        let book = self.book.get()?;
        let verses = show_nothing(self.store.chapter_verses(book.id, chapter), "chapter");
        let view = ChapterView {
            book,
            chapter,
            verses,
        };
        self.chapter.set(Some(view.clone()));
        Some(view)
    }

    /// Build the external reference of a verse in the open translation.
    pub fn reference_for(&self, book: &Book, verse: &Verse) -> Option<String> {
        let translation = self.translation.get()?;
        Some(
            VerseRef::new(
                translation.code,
                book.book_reference_id,
                verse.chapter,
                verse.verse,
            )
            .to_string(),
        )
    }

    fn verse_view(&self, verse: Verse) -> Lookup<VerseView> {
        let Some(translation) = self.translation.get() else {
            return Lookup::Failed(StoreError::Unavailable);
        };
        self.store.book(verse.book_id).map(|book| {
            let reference =
                VerseRef::new(translation.code, book.book_reference_id, verse.chapter, verse.verse)
                    .to_string();
            VerseView {
                translation,
                book,
                verse,
                reference,
            }
        })
    }

    /// Resolve an external verse reference in the open translation.
    pub fn resolve(&self, external_id: &str) -> Lookup<VerseView> {
        self.store
            .resolve(external_id)
            .and_then(|verse| self.verse_view(verse))
    }

    /// Resolve a reference and bring its book and chapter on screen.
    pub fn open_reference(&self, external_id: &str) -> Lookup<VerseView> {
        let lookup = self.resolve(external_id);
        match &lookup {
            Lookup::Found(view) => {
                self.show_book(Some(view.book.clone()));
                self.open_chapter(view.verse.chapter);
                self.focus_verse(&view.book, &view.verse);
            }
            Lookup::NotFound => log::info!("verse reference '{external_id}' not found"),
            Lookup::Failed(err) => log::error!("could not resolve '{external_id}': {err}"),
        }
        lookup
    }

    /// Refresh the favorite flag for the verse under the cursor.
    pub fn focus_verse(&self, book: &Book, verse: &Verse) {
        let favorite = self
            .reference_for(book, verse)
            .map(|reference| self.is_favorite(FavoriteKind::Verse, &reference))
            .unwrap_or(false);
        self.verse_favorite.set(favorite);
    }

    /// Flip the favorite state of a verse. Returns whether it is a favorite
    /// afterwards.
    pub fn toggle_verse_favorite(&self, book: &Book, verse: &Verse) -> Result<bool, PreferenceError> {
        let Some(reference) = self.reference_for(book, verse) else {
            return Ok(false);
        };
        let member = self.prefs.toggle_favorite(FavoriteKind::Verse, &reference)?;
        self.verse_favorite.set(member);
        Ok(member)
    }

    pub fn is_favorite(&self, kind: FavoriteKind, id: &str) -> bool {
        self.prefs.is_favorite(kind, id).unwrap_or_else(|err| {
            log::error!("could not read {} favorites: {err}", kind.label());
            false
        })
    }

    /// Favorite verses resolved in the open translation. References that do
    /// not resolve are skipped.
    pub fn favorite_verses(&self) -> Vec<VerseView> {
        let ids = match self.prefs.favorites(FavoriteKind::Verse) {
            Ok(ids) => ids,
            Err(err) => {
                log::error!("could not read verse favorites: {err}");
                return Vec::new();
            }
        };
        ids.iter()
            .filter_map(|id| self.resolve(id).found())
            .collect()
    }
}

/// Collapse a store failure into an empty value, logging the cause.
fn show_nothing<T: Default>(result: Result<T, StoreError>, what: &str) -> T {
    result.unwrap_or_else(|err| {
        log::error!("failed to load {what}: {err}");
        T::default()
    })
}
