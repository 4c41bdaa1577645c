use std::collections::BTreeSet;
use std::mem;
use std::sync::{mpsc, Arc};
use std::thread;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::catalog::TRANSLATIONS;
use crate::db::Lookup;
use crate::media::open_media;
use crate::models::{Hymn, MediaItem, Translation};
use crate::prefs::FavoriteKind;
use crate::session::ReaderSession;

use super::helpers::{centered_rect, favorite_marker, key_span, surface_error, wrap_text};
use super::screens::{favorite_media, BibleScreen, FavoriteEntry, HymnScreen, Selection};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 10;

/// Top-level tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Bible,
    Hymnal,
    Scores,
    Music,
    Favorites,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Bible, Tab::Hymnal, Tab::Scores, Tab::Music, Tab::Favorites];

    fn title(self) -> &'static str {
        match self {
            Tab::Bible => "Bible",
            Tab::Hymnal => "Hymnal",
            Tab::Scores => "Scores",
            Tab::Music => "Music",
            Tab::Favorites => "Favorites",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    fn offset(self, by: isize) -> Tab {
        let len = Tab::ALL.len() as isize;
        Tab::ALL[(self.index() as isize + by).rem_euclid(len) as usize]
    }
}

/// Fine-grained input modes layered over the current tab.
enum Mode {
    Normal,
    GoTo(String),
    Searching(String),
}

/// Results posted back by background threads.
pub enum AppMessage {
    TranslationSwitched {
        translation: Option<Translation>,
        opened: bool,
    },
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    session: Arc<ReaderSession>,
    hymns: HymnScreen,
    scores: Vec<MediaItem>,
    music: Vec<MediaItem>,
    tab: Tab,
    bible: BibleScreen,
    translation_cursor: Selection,
    book_cursor: Selection,
    chapter_cursor: Selection,
    verse_cursor: Selection,
    score_cursor: Selection,
    music_cursor: Selection,
    favorites: Vec<FavoriteEntry>,
    favorite_cursor: Selection,
    mode: Mode,
    status: Option<StatusMessage>,
    switching: bool,
    /// Favorite flag of the focused verse, fed by the session's deduplicated
    /// stream.
    verse_favorite: bool,
    verse_favorite_rx: mpsc::Receiver<bool>,
    message_rx: mpsc::Receiver<AppMessage>,
    message_tx: mpsc::Sender<AppMessage>,
}

impl App {
    pub fn new(
        session: Arc<ReaderSession>,
        hymns: Vec<Hymn>,
        scores: Vec<MediaItem>,
        music: Vec<MediaItem>,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::channel();
        let verse_favorite_rx = session.verse_favorite().subscribe();
        Self {
            session,
            hymns: HymnScreen::new(hymns),
            scores,
            music,
            tab: Tab::Bible,
            bible: BibleScreen::Books,
            translation_cursor: Selection::default(),
            book_cursor: Selection::default(),
            chapter_cursor: Selection::default(),
            verse_cursor: Selection::default(),
            score_cursor: Selection::default(),
            music_cursor: Selection::default(),
            favorites: Vec::new(),
            favorite_cursor: Selection::default(),
            mode: Mode::Normal,
            status: None,
            switching: false,
            verse_favorite: false,
            verse_favorite_rx,
            message_rx,
            message_tx,
        }
    }

    /// Reopen the remembered translation off the input thread.
    pub fn start(&mut self) {
        self.spawn_switch(None);
    }

    fn switch_translation(&mut self, translation: Translation) {
        self.set_status(format!("Opening {}...", translation.name), StatusKind::Info);
        self.spawn_switch(Some(translation));
    }

    fn spawn_switch(&mut self, translation: Option<Translation>) {
        self.switching = true;
        let session = Arc::clone(&self.session);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let opened = match translation {
                Some(translation) => session.select_translation(translation),
                None => session.restore_translation(),
            };
            let translation = session.translation().get();
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(AppMessage::TranslationSwitched {
                translation,
                opened,
            });
        });
    }

    /// Drain all pending messages from background threads and session
    /// streams.
    pub fn process_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            self.handle_message(message);
        }
        while let Ok(favorite) = self.verse_favorite_rx.try_recv() {
            self.verse_favorite = favorite;
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::TranslationSwitched {
                translation,
                opened,
            } => {
                self.switching = false;
                self.book_cursor = Selection::default();
                self.chapter_cursor = Selection::default();
                self.verse_cursor = Selection::default();
                if self.tab == Tab::Bible {
                    self.bible = BibleScreen::Books;
                }
                match (opened, translation) {
                    (true, Some(translation)) => {
                        self.set_status(format!("Opened {}.", translation.name), StatusKind::Info)
                    }
                    _ => self.set_status(
                        "Could not open the translation. See the log for details.",
                        StatusKind::Error,
                    ),
                }
                if self.tab == Tab::Favorites {
                    self.refresh_favorites();
                }
            }
        }
    }

    /// Handle one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::GoTo(input) => self.handle_goto(code, input),
            Mode::Searching(query) => self.handle_search(code, query),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Tab => {
                self.select_tab(self.tab.offset(1));
                return Mode::Normal;
            }
            KeyCode::BackTab => {
                self.select_tab(self.tab.offset(-1));
                return Mode::Normal;
            }
            KeyCode::Char(digit @ '1'..='5') => {
                let idx = digit as usize - '1' as usize;
                self.select_tab(Tab::ALL[idx]);
                return Mode::Normal;
            }
            KeyCode::Char('g') => {
                self.clear_status();
                return Mode::GoTo(String::new());
            }
            KeyCode::Char('t') => {
                self.select_tab(Tab::Bible);
                self.open_translation_picker();
                return Mode::Normal;
            }
            _ => {}
        }

        match self.tab {
            Tab::Bible => {
                self.handle_bible_key(code);
                Mode::Normal
            }
            Tab::Hymnal => self.handle_hymnal_key(code),
            Tab::Scores => {
                self.handle_media_key(code, FavoriteKind::Score);
                Mode::Normal
            }
            Tab::Music => {
                self.handle_media_key(code, FavoriteKind::Music);
                Mode::Normal
            }
            Tab::Favorites => {
                self.handle_favorites_key(code);
                Mode::Normal
            }
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        if tab == Tab::Favorites {
            self.refresh_favorites();
        }
    }

    fn open_translation_picker(&mut self) {
        let current = self.session.translation().get();
        let idx = current
            .and_then(|open| TRANSLATIONS.iter().position(|t| t.file_name == open.file_name))
            .unwrap_or(0);
        self.translation_cursor.select(idx, TRANSLATIONS.len());
        self.bible = BibleScreen::Translations;
    }

    fn handle_bible_key(&mut self, code: KeyCode) {
        match self.bible {
            BibleScreen::Translations => match code {
                KeyCode::Up => self.translation_cursor.move_by(-1, TRANSLATIONS.len()),
                KeyCode::Down => self.translation_cursor.move_by(1, TRANSLATIONS.len()),
                KeyCode::Enter => {
                    if self.store_busy() {
                        return;
                    }
                    if let Some(translation) = self.translation_cursor.current(TRANSLATIONS) {
                        self.bible = BibleScreen::Books;
                        self.switch_translation(*translation);
                    }
                }
                KeyCode::Esc => self.bible = BibleScreen::Books,
                _ => {}
            },
            BibleScreen::Books => {
                let names = self.session.book_names().get();
                match code {
                    KeyCode::Up => self.book_cursor.move_by(-1, names.len()),
                    KeyCode::Down => self.book_cursor.move_by(1, names.len()),
                    KeyCode::PageUp => self.book_cursor.move_by(-PAGE, names.len()),
                    KeyCode::PageDown => self.book_cursor.move_by(PAGE, names.len()),
                    KeyCode::Enter => {
                        if self.store_busy() {
                            return;
                        }
                        let Some(name) = self.book_cursor.current(&names) else {
                            self.set_status("No book selected.", StatusKind::Error);
                            return;
                        };
                        if self.session.open_book(name).is_some() {
                            self.clear_status();
                            self.chapter_cursor = Selection::default();
                            self.bible = BibleScreen::Chapters;
                        } else {
                            self.set_status(format!("Could not load {name}."), StatusKind::Error);
                        }
                    }
                    _ => {}
                }
            }
            BibleScreen::Chapters => {
                let chapters = self.session.chapter_numbers().get();
                match code {
                    KeyCode::Up | KeyCode::Left => self.chapter_cursor.move_by(-1, chapters.len()),
                    KeyCode::Down | KeyCode::Right => {
                        self.chapter_cursor.move_by(1, chapters.len())
                    }
                    KeyCode::PageUp => self.chapter_cursor.move_by(-PAGE, chapters.len()),
                    KeyCode::PageDown => self.chapter_cursor.move_by(PAGE, chapters.len()),
                    KeyCode::Enter => {
                        if let Some(chapter) = self.chapter_cursor.current(&chapters).copied() {
                            self.show_chapter(chapter);
                        }
                    }
                    KeyCode::Esc | KeyCode::Backspace => self.bible = BibleScreen::Books,
                    _ => {}
                }
            }
            BibleScreen::Reading => {
                let verse_count = self
                    .session
                    .chapter()
                    .get()
                    .map(|view| view.verses.len())
                    .unwrap_or(0);
                match code {
                    KeyCode::Up => {
                        self.verse_cursor.move_by(-1, verse_count);
                        self.focus_current_verse();
                    }
                    KeyCode::Down => {
                        self.verse_cursor.move_by(1, verse_count);
                        self.focus_current_verse();
                    }
                    KeyCode::PageUp => {
                        self.verse_cursor.move_by(-PAGE, verse_count);
                        self.focus_current_verse();
                    }
                    KeyCode::PageDown => {
                        self.verse_cursor.move_by(PAGE, verse_count);
                        self.focus_current_verse();
                    }
                    KeyCode::Left => self.move_chapter(-1),
                    KeyCode::Right => self.move_chapter(1),
                    KeyCode::Char('f') => self.toggle_current_verse(),
                    KeyCode::Esc | KeyCode::Backspace => self.bible = BibleScreen::Chapters,
                    _ => {}
                }
            }
        }
    }

    fn show_chapter(&mut self, chapter: i64) {
        if self.store_busy() {
            return;
        }
        let Some(view) = self.session.open_chapter(chapter) else {
            self.set_status("Open a book first.", StatusKind::Error);
            return;
        };
        self.verse_cursor = Selection::default();
        self.bible = BibleScreen::Reading;
        if view.verses.is_empty() {
            self.set_status(
                format!("{} {} has no verses.", view.book.name, chapter),
                StatusKind::Error,
            );
        } else {
            self.clear_status();
            self.focus_current_verse();
        }
    }

    fn move_chapter(&mut self, offset: isize) {
        let chapters = self.session.chapter_numbers().get();
        let before = self.chapter_cursor;
        self.chapter_cursor.move_by(offset, chapters.len());
        if self.chapter_cursor == before {
            return;
        }
        if let Some(chapter) = self.chapter_cursor.current(&chapters).copied() {
            self.show_chapter(chapter);
        }
    }

    fn focus_current_verse(&self) {
        if let Some(view) = self.session.chapter().get() {
            if let Some(verse) = self.verse_cursor.current(&view.verses) {
                self.session.focus_verse(&view.book, verse);
            }
        }
    }

    fn toggle_current_verse(&mut self) {
        let Some(view) = self.session.chapter().get() else {
            return;
        };
        let Some(verse) = self.verse_cursor.current(&view.verses) else {
            return;
        };
        let citation = format!("{} {}:{}", view.book.name, verse.chapter, verse.verse);
        match self.session.toggle_verse_favorite(&view.book, verse) {
            Ok(true) => self.set_status(format!("Added {citation} to favorites."), StatusKind::Info),
            Ok(false) => self.set_status(
                format!("Removed {citation} from favorites."),
                StatusKind::Info,
            ),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn handle_goto(&mut self, code: KeyCode, mut input: String) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Enter => {
                let reference = input.trim().to_string();
                if !reference.is_empty() {
                    self.go_to_reference(&reference);
                }
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c.to_ascii_uppercase()),
            _ => {}
        }
        Mode::GoTo(input)
    }

    fn go_to_reference(&mut self, reference: &str) {
        if self.store_busy() {
            return;
        }
        match self.session.open_reference(reference) {
            Lookup::Found(view) => {
                let names = self.session.book_names().get();
                if let Some(idx) = names.iter().position(|name| *name == view.book.name) {
                    self.book_cursor.select(idx, names.len());
                }
                let chapters = self.session.chapter_numbers().get();
                if let Some(idx) = chapters.iter().position(|c| *c == view.verse.chapter) {
                    self.chapter_cursor.select(idx, chapters.len());
                }
                if let Some(chapter) = self.session.chapter().get() {
                    if let Some(idx) = chapter.verses.iter().position(|v| v.id == view.verse.id) {
                        self.verse_cursor.select(idx, chapter.verses.len());
                    }
                }
                self.tab = Tab::Bible;
                self.bible = BibleScreen::Reading;
                self.set_status(view.citation(), StatusKind::Info);
            }
            Lookup::NotFound => {
                self.set_status(format!("No verse found for {reference}."), StatusKind::Error)
            }
            Lookup::Failed(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn handle_hymnal_key(&mut self, code: KeyCode) -> Mode {
        if self.hymns.open.is_some() {
            match code {
                KeyCode::Up => self.hymns.scroll = self.hymns.scroll.saturating_sub(1),
                KeyCode::Down => self.hymns.scroll = self.hymns.scroll.saturating_add(1),
                KeyCode::Char('f') => {
                    if let Some(hymn) = self.hymns.opened().cloned() {
                        self.toggle_favorite(FavoriteKind::Hymn, &hymn.favorite_id(), &hymn.title);
                    }
                }
                KeyCode::Esc | KeyCode::Backspace => self.hymns.open = None,
                _ => {}
            }
            return Mode::Normal;
        }

        let len = self.hymns.filtered.len();
        match code {
            KeyCode::Up => self.hymns.selection.move_by(-1, len),
            KeyCode::Down => self.hymns.selection.move_by(1, len),
            KeyCode::PageUp => self.hymns.selection.move_by(-PAGE, len),
            KeyCode::PageDown => self.hymns.selection.move_by(PAGE, len),
            KeyCode::Enter => {
                if !self.hymns.open_current() {
                    self.set_status("No hymn selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('f') => {
                if let Some(hymn) = self.hymns.current().cloned() {
                    self.toggle_favorite(FavoriteKind::Hymn, &hymn.favorite_id(), &hymn.title);
                }
            }
            KeyCode::Char('/') => {
                let query = self.hymns.filter.clone().unwrap_or_default();
                return Mode::Searching(query);
            }
            KeyCode::Esc => {
                if self.hymns.filter.is_some() {
                    self.hymns.set_filter(None);
                    self.set_status("Search cleared.", StatusKind::Info);
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Mode {
        match code {
            KeyCode::Esc => {
                self.hymns.set_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(c) => query.push(c),
            _ => return Mode::Searching(query),
        }
        let filter = if query.is_empty() {
            None
        } else {
            Some(query.clone())
        };
        self.hymns.set_filter(filter);
        Mode::Searching(query)
    }

    fn handle_media_key(&mut self, code: KeyCode, kind: FavoriteKind) {
        let (items, cursor) = match kind {
            FavoriteKind::Music => (&self.music, &mut self.music_cursor),
            _ => (&self.scores, &mut self.score_cursor),
        };
        let len = items.len();
        match code {
            KeyCode::Up => cursor.move_by(-1, len),
            KeyCode::Down => cursor.move_by(1, len),
            KeyCode::PageUp => cursor.move_by(-PAGE, len),
            KeyCode::PageDown => cursor.move_by(PAGE, len),
            KeyCode::Enter | KeyCode::Char('o') => {
                if let Some(item) = cursor.current(items).cloned() {
                    self.open_item(&item);
                }
            }
            KeyCode::Char('f') => {
                if let Some(item) = cursor.current(items).cloned() {
                    self.toggle_favorite(kind, &item.id, &item.title);
                }
            }
            _ => {}
        }
    }

    fn open_item(&mut self, item: &MediaItem) {
        match open_media(item) {
            Ok(()) => self.set_status(format!("Opened {}.", item.title), StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn handle_favorites_key(&mut self, code: KeyCode) {
        let len = self.favorites.len();
        match code {
            KeyCode::Up => self.favorite_cursor.move_by(-1, len),
            KeyCode::Down => self.favorite_cursor.move_by(1, len),
            KeyCode::Enter => {
                let Some(entry) = self.favorite_cursor.current(&self.favorites).cloned() else {
                    return;
                };
                match entry {
                    FavoriteEntry::Verse(view) => self.go_to_reference(&view.reference),
                    FavoriteEntry::Hymn(hymn) => {
                        self.hymns.set_filter(None);
                        self.hymns.open = self.hymns.find_by_id(&hymn.favorite_id());
                        self.hymns.scroll = 0;
                        self.tab = Tab::Hymnal;
                    }
                    FavoriteEntry::Score(item) | FavoriteEntry::Music(item) => {
                        self.open_item(&item)
                    }
                }
            }
            KeyCode::Char('f') | KeyCode::Delete => {
                let Some(entry) = self.favorite_cursor.current(&self.favorites).cloned() else {
                    return;
                };
                match self
                    .session
                    .preferences()
                    .remove_favorite(entry.kind(), &entry.id())
                {
                    Ok(_) => self.set_status("Removed from favorites.", StatusKind::Info),
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                self.refresh_favorites();
            }
            _ => {}
        }
    }

    fn toggle_favorite(&mut self, kind: FavoriteKind, id: &str, label: &str) {
        match self.session.preferences().toggle_favorite(kind, id) {
            Ok(true) => self.set_status(format!("Added {label} to favorites."), StatusKind::Info),
            Ok(false) => {
                self.set_status(format!("Removed {label} from favorites."), StatusKind::Info)
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn favorite_ids(&self, kind: FavoriteKind) -> BTreeSet<String> {
        self.session
            .preferences()
            .favorites(kind)
            .unwrap_or_else(|err| {
                log::error!("could not read {} favorites: {err}", kind.label());
                BTreeSet::new()
            })
    }

    fn refresh_favorites(&mut self) {
        if self.store_busy() {
            return;
        }
        let mut entries: Vec<FavoriteEntry> = self
            .session
            .favorite_verses()
            .into_iter()
            .map(FavoriteEntry::Verse)
            .collect();

        let hymn_ids = self.favorite_ids(FavoriteKind::Hymn);
        entries.extend(
            self.hymns
                .hymns
                .iter()
                .filter(|hymn| hymn_ids.contains(&hymn.favorite_id()))
                .cloned()
                .map(FavoriteEntry::Hymn),
        );

        let score_ids = self.favorite_ids(FavoriteKind::Score);
        entries.extend(
            favorite_media(&self.scores, &score_ids)
                .cloned()
                .map(FavoriteEntry::Score),
        );

        let music_ids = self.favorite_ids(FavoriteKind::Music);
        entries.extend(
            favorite_media(&self.music, &music_ids)
                .cloned()
                .map(FavoriteEntry::Music),
        );

        self.favorites = entries;
        self.favorite_cursor.clamp(self.favorites.len());
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);

        match self.tab {
            Tab::Bible => self.draw_bible(frame, chunks[1]),
            Tab::Hymnal => self.draw_hymnal(frame, chunks[1]),
            Tab::Scores => self.draw_media(frame, chunks[1], FavoriteKind::Score),
            Tab::Music => self.draw_media(frame, chunks[1], FavoriteKind::Music),
            Tab::Favorites => self.draw_favorites(frame, chunks[1]),
        }

        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::GoTo(input) => {
                self.draw_prompt(frame, area, "Go to verse (e.g. ACF_JO_3_16)", "Reference: ", input)
            }
            Mode::Searching(query) => self.draw_prompt(frame, area, "Search hymns", "Search: ", query),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let title = match (self.session.translation().get(), self.switching) {
            (_, true) => " Opening translation... ".to_string(),
            (Some(translation), false) => format!(" {translation} "),
            (None, false) => " No translation open ".to_string(),
        };
        let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()).collect::<Vec<_>>())
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(tabs, area);
    }

    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: String,
        items: Vec<ListItem<'static>>,
        selected: usize,
        empty: &str,
    ) {
        let block = Block::default().borders(Borders::ALL).title(title);
        if items.is_empty() {
            let message = Paragraph::new(empty.to_string())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_bible(&self, frame: &mut Frame, area: Rect) {
        let translation = self.session.translation().get();
        let translation_code = translation.map(|t| t.code).unwrap_or("-");

        match self.bible {
            BibleScreen::Translations => {
                let items = TRANSLATIONS
                    .iter()
                    .map(|t| {
                        let open = translation.map(|o| o.file_name == t.file_name).unwrap_or(false);
                        let marker = if open { "* " } else { "  " };
                        ListItem::new(format!("{marker}{} ({})", t.name, t.code))
                    })
                    .collect();
                self.render_list(
                    frame,
                    area,
                    "Translations".to_string(),
                    items,
                    self.translation_cursor.index,
                    "No translations.",
                );
            }
            BibleScreen::Books => {
                let items = self
                    .session
                    .book_names()
                    .get()
                    .into_iter()
                    .map(ListItem::new)
                    .collect();
                let empty = if self.switching {
                    "Opening translation..."
                } else {
                    "Nothing to show. Press 't' to pick a translation."
                };
                self.render_list(
                    frame,
                    area,
                    format!("Books - {translation_code}"),
                    items,
                    self.book_cursor.index,
                    empty,
                );
            }
            BibleScreen::Chapters => {
                let book = self
                    .session
                    .book()
                    .get()
                    .map(|b| b.name)
                    .unwrap_or_default();
                let items = self
                    .session
                    .chapter_numbers()
                    .get()
                    .into_iter()
                    .map(|chapter| ListItem::new(format!("Chapter {chapter}")))
                    .collect();
                self.render_list(
                    frame,
                    area,
                    format!("{book} - {translation_code}"),
                    items,
                    self.chapter_cursor.index,
                    "Nothing to show.",
                );
            }
            BibleScreen::Reading => self.draw_reading(frame, area),
        }
    }

    fn draw_reading(&self, frame: &mut Frame, area: Rect) {
        let Some(view) = self.session.chapter().get() else {
            self.render_list(frame, area, "Reading".to_string(), Vec::new(), 0, "Nothing to show.");
            return;
        };

        let favorites = self.favorite_ids(FavoriteKind::Verse);
        let width = area.width.saturating_sub(6) as usize;
        let items = view
            .verses
            .iter()
            .map(|verse| {
                let favorite = self
                    .session
                    .reference_for(&view.book, verse)
                    .map(|reference| favorites.contains(&reference))
                    .unwrap_or(false);
                let text = format!("{}{} {}", favorite_marker(favorite), verse.verse, verse.text);
                let lines: Vec<Line<'static>> =
                    wrap_text(&text, width).into_iter().map(Line::from).collect();
                ListItem::new(lines)
            })
            .collect();

        self.render_list(
            frame,
            area,
            format!("{} {}", view.book.name, view.chapter),
            items,
            self.verse_cursor.index,
            "This chapter has no verses.",
        );
    }

    fn draw_hymnal(&self, frame: &mut Frame, area: Rect) {
        let favorites = self.favorite_ids(FavoriteKind::Hymn);

        if let Some(hymn) = self.hymns.opened() {
            let favorite = favorites.contains(&hymn.favorite_id());
            let title = format!("{}{}", favorite_marker(favorite), hymn.display_title());
            let lyrics = if hymn.lyrics.trim().is_empty() {
                "No lyrics for this hymn.".to_string()
            } else {
                hymn.lyrics.clone()
            };
            let paragraph = Paragraph::new(lyrics)
                .wrap(Wrap { trim: false })
                .scroll((self.hymns.scroll, 0))
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(paragraph, area);
            return;
        }

        let items = self
            .hymns
            .filtered
            .iter()
            .filter_map(|idx| self.hymns.hymns.get(*idx))
            .map(|hymn| {
                let favorite = favorites.contains(&hymn.favorite_id());
                ListItem::new(format!("{}{}", favorite_marker(favorite), hymn.display_title()))
            })
            .collect();
        let title = match &self.hymns.filter {
            Some(filter) => format!("Hymnal - \"{filter}\""),
            None => format!("Hymnal ({} hymns)", self.hymns.hymns.len()),
        };
        self.render_list(
            frame,
            area,
            title,
            items,
            self.hymns.selection.index,
            "No hymns.",
        );
    }

    fn draw_media(&self, frame: &mut Frame, area: Rect, kind: FavoriteKind) {
        let (items, cursor, title) = match kind {
            FavoriteKind::Music => (&self.music, self.music_cursor, "Music"),
            _ => (&self.scores, self.score_cursor, "Scores"),
        };
        let favorites = self.favorite_ids(kind);
        let rows = items
            .iter()
            .map(|item| {
                let favorite = favorites.contains(&item.id);
                ListItem::new(format!("{}{}", favorite_marker(favorite), item.title))
            })
            .collect();
        self.render_list(
            frame,
            area,
            title.to_string(),
            rows,
            cursor.index,
            "No files found in the assets directory.",
        );
    }

    fn draw_favorites(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(6) as usize;
        let items = self
            .favorites
            .iter()
            .map(|entry| {
                let text = format!("[{}] {}", entry.kind().label(), entry.label());
                let lines: Vec<Line<'static>> =
                    wrap_text(&text, width).into_iter().map(Line::from).collect();
                ListItem::new(lines)
            })
            .collect();
        self.render_list(
            frame,
            area,
            "Favorites".to_string(),
            items,
            self.favorite_cursor.index,
            "No favorites yet. Press 'f' on a verse, hymn, score or song.",
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let mut spans = match (&self.mode, self.tab, self.bible) {
            (Mode::GoTo(_), _, _) | (Mode::Searching(_), _, _) => {
                return Line::from(vec![
                    key_span("[Enter]"),
                    Span::raw(" Confirm   "),
                    key_span("[Esc]"),
                    Span::raw(" Cancel"),
                ]);
            }
            (_, Tab::Bible, BibleScreen::Reading) => {
                let favorite = if self.verse_favorite {
                    " Unfavorite   "
                } else {
                    " Favorite   "
                };
                vec![
                    key_span("[↑↓]"),
                    Span::raw(" Verse   "),
                    key_span("[←→]"),
                    Span::raw(" Chapter   "),
                    key_span("[f]"),
                    Span::raw(favorite),
                    key_span("[Esc]"),
                    Span::raw(" Back   "),
                ]
            }
            (_, Tab::Bible, BibleScreen::Translations) => vec![
                key_span("[Enter]"),
                Span::raw(" Open   "),
                key_span("[Esc]"),
                Span::raw(" Back   "),
            ],
            (_, Tab::Bible, _) => vec![
                key_span("[Enter]"),
                Span::raw(" Open   "),
                key_span("[Esc]"),
                Span::raw(" Back   "),
                key_span("[t]"),
                Span::raw(" Translation   "),
            ],
            (_, Tab::Hymnal, _) => vec![
                key_span("[Enter]"),
                Span::raw(" Read   "),
                key_span("[/]"),
                Span::raw(" Search   "),
                key_span("[f]"),
                Span::raw(" Favorite   "),
            ],
            (_, Tab::Scores, _) | (_, Tab::Music, _) => vec![
                key_span("[Enter]"),
                Span::raw(" Open   "),
                key_span("[f]"),
                Span::raw(" Favorite   "),
            ],
            (_, Tab::Favorites, _) => vec![
                key_span("[Enter]"),
                Span::raw(" Go   "),
                key_span("[f]"),
                Span::raw(" Remove   "),
            ],
        };
        spans.extend([
            key_span("[g]"),
            Span::raw(" Go to   "),
            key_span("[Tab]"),
            Span::raw(" Switch   "),
            key_span("[q]"),
            Span::raw(" Quit"),
        ]);
        Line::from(spans)
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, title: &str, label: &str, input: &str) {
        let popup = centered_rect(60, 20, area);
        let popup_area = Rect {
            height: 3u16.min(area.height),
            ..popup
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title.to_string());
        let paragraph = Paragraph::new(Span::raw(format!("{label}{input}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + (label.chars().count() + input.chars().count()) as u16;
        frame.set_cursor_position((cursor_x.min(inner.x + inner.width), inner.y));
    }

    /// A running switch holds the store lock through open and seed migration,
    /// so store-backed actions are refused until it reports back.
    fn store_busy(&mut self) -> bool {
        if self.switching {
            self.set_status(
                "Still opening the translation. Try again in a moment.",
                StatusKind::Info,
            );
        }
        self.switching
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_translation;
    use crate::config::AppPaths;
    use crate::db::{StorePaths, TranslationStore};
    use crate::prefs::Preferences;

    fn app_with_genesis(dir: &tempfile::TempDir) -> App {
        let paths = AppPaths::new(dir.path().join("data"), dir.path().join("assets"));
        let store = Arc::new(TranslationStore::new(StorePaths::from(&paths)));
        let prefs = Arc::new(Preferences::open_in_memory().unwrap());
        let session = Arc::new(ReaderSession::new(Arc::clone(&store), prefs));
        assert!(session.select_translation(default_translation()));
        store
            .with_connection(|conn| {
                conn.execute_batch(
                    "INSERT INTO book (id, book_reference_id, testament_reference_id, name)
                         VALUES (1, 1, 1, 'Gênesis');
                     INSERT INTO verse (id, book_id, chapter, verse, text)
                         VALUES (1, 1, 1, 1, 'No princípio criou Deus os céus e a terra.');",
                )?;
                Ok(())
            })
            .unwrap();
        App::new(session, Vec::new(), Vec::new(), Vec::new())
    }

    fn go_to(app: &mut App, reference: &str) {
        app.handle_key(KeyCode::Char('g'));
        for c in reference.chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    #[test]
    fn store_actions_wait_for_a_running_switch() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_genesis(&dir);
        app.session
            .preferences()
            .add_favorite(FavoriteKind::Verse, "ACF_GN_1_1")
            .unwrap();
        app.switching = true;

        go_to(&mut app, "ACF_GN_1_1");
        assert!(app.session.chapter().get().is_none());
        assert!(status_text(&app).starts_with("Still opening"));

        app.handle_key(KeyCode::Char('5'));
        assert_eq!(app.tab, Tab::Favorites);
        assert!(app.favorites.is_empty());

        app.handle_key(KeyCode::Char('t'));
        app.handle_key(KeyCode::Enter);
        assert!(app.switching);
        assert_eq!(app.bible, BibleScreen::Translations);
    }

    #[test]
    fn store_actions_resume_once_the_switch_reports_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_genesis(&dir);
        app.session
            .preferences()
            .add_favorite(FavoriteKind::Verse, "ACF_GN_1_1")
            .unwrap();
        app.switching = true;
        app.handle_key(KeyCode::Char('5'));

        app.message_tx
            .send(AppMessage::TranslationSwitched {
                translation: Some(default_translation()),
                opened: true,
            })
            .unwrap();
        app.process_messages();
        assert!(!app.switching);
        assert_eq!(app.favorites.len(), 1);

        go_to(&mut app, "ACF_GN_1_1");
        assert_eq!(app.tab, Tab::Bible);
        assert_eq!(
            app.session.chapter().get().map(|c| c.verses.len()),
            Some(1)
        );
    }

    #[test]
    fn footer_flag_follows_the_favorite_stream() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_genesis(&dir);
        go_to(&mut app, "ACF_GN_1_1");
        app.process_messages();
        assert!(!app.verse_favorite);

        app.handle_key(KeyCode::Char('f'));
        assert!(!app.verse_favorite);
        app.process_messages();
        assert!(app.verse_favorite);

        app.handle_key(KeyCode::Char('f'));
        app.process_messages();
        assert!(!app.verse_favorite);
    }
}
